use std::path::Path;

use regex::Captures;

use crate::engine::{Grammar, Rule, Scope};
use crate::ir::{Message, Tool};

/// Grammar for Biber, which prefixes every line with its level.
///
/// Finishes on `Output to <file>` and links Biber's own transcript: the
/// `Logfile is` name when Biber announced one, else the output with a
/// `.blg` extension.
#[derive(Debug, Default, Clone)]
pub struct Biber {
    transcript: Option<String>,
}

impl Biber {
    pub fn new() -> Self {
        Self::default()
    }

    fn info(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        scope.info(line);
    }

    fn logfile(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, line: &str) {
        self.transcript = Some(caps[1].to_string());
        scope.info(line);
    }

    fn warning(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        scope.warning(line);
    }

    fn error(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        scope.error(line);
    }

    fn fatal(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        scope.fatal(line);
    }

    fn output(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, _: &str) {
        let path = self.transcript.take().unwrap_or_else(|| {
            Path::new(caps[1].trim())
                .with_extension("blg")
                .to_string_lossy()
                .into_owned()
        });
        scope.emit(Message::Transcript { path });
        scope.finish();
    }
}

impl Grammar for Biber {
    const TOOL: Tool = Tool::Biber;

    fn rules(&self) -> Vec<Rule<Self>> {
        vec![
            Rule::new("INFO - This is Biber", Self::info),
            Rule::new("INFO - Logfile is '(.*)'", Self::logfile),
            Rule::new("WARN", Self::warning),
            Rule::new("ERROR", Self::error),
            Rule::new("FATAL", Self::fatal),
            Rule::new(".*Output to (.*)$", Self::output),
        ]
    }
}
