use regex::Captures;

use super::{line_number, normalize_path};
use crate::engine::{Grammar, Rule, Scope};
use crate::ir::{Location, Message, Severity, Tool};

/// Grammar for the ChkTeX linter.
///
/// Each finding is followed by the offending source line and a caret line,
/// both echoed verbatim. Finishes on the `N errors printed; M warnings
/// printed` tally.
#[derive(Debug, Default, Clone, Copy)]
pub struct Chktex;

impl Chktex {
    fn info(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        scope.info(line);
    }

    fn finding(scope: &mut Scope<'_, '_>, caps: &Captures<'_>, severity: Severity) {
        let location = Location::new(normalize_path(&caps[1]), line_number(&caps[2]));
        let description = caps[3].trim();
        match severity {
            Severity::Error => scope.located_error(description, location),
            Severity::Warning => scope.located_warning(description, location),
        }

        let Some(source) = scope.read_physical() else {
            return;
        };
        if source.len() > 1 {
            let caret = scope.read_physical().unwrap_or_default();
            scope.emit(Message::Excerpt {
                lines: vec![source, caret],
            });
        }
    }

    fn warning(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, _: &str) {
        Self::finding(scope, caps, Severity::Warning);
    }

    fn error(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, _: &str) {
        Self::finding(scope, caps, Severity::Error);
    }

    fn finish(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, _: &str) {
        scope.finish();
    }
}

impl Grammar for Chktex {
    const TOOL: Tool = Tool::Chktex;

    fn rules(&self) -> Vec<Rule<Self>> {
        vec![
            Rule::new("ChkTeX", Self::info),
            Rule::new(r"Warning \d+ in (.*\.tex) line (\d+):(.*)", Self::warning),
            Rule::new(r"Error \d+ in (.*\.tex) line (\d+):(.*)", Self::error),
            Rule::new(r"(\d+) errors? printed; (\d+) warnings? printed", Self::finish),
        ]
    }
}
