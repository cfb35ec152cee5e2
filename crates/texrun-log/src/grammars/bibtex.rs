use regex::Captures;

use crate::engine::{Grammar, Rule, Scope};
use crate::ir::Tool;

/// Grammar for BibTeX. Finishes on `---` or the closing `(There were ...)` tally.
#[derive(Debug, Default, Clone, Copy)]
pub struct Bibtex;

impl Bibtex {
    fn info(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        scope.info(line);
    }

    fn warning(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        scope.warning(line);
    }

    fn error(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        scope.error(line);
    }

    fn finish(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, _: &str) {
        scope.finish();
    }
}

impl Grammar for Bibtex {
    const TOOL: Tool = Tool::Bibtex;

    fn rules(&self) -> Vec<Rule<Self>> {
        vec![
            Rule::new("Warning--", Self::warning),
            Rule::new(r"I found no \\\w+ command", Self::error),
            Rule::new("I couldn't open style file", Self::error),
            Rule::new(r"You're missing a field name---line (\d+)", Self::error),
            Rule::new(r"Too many commas in name \d+ of", Self::error),
            Rule::new("I was expecting a", Self::error),
            Rule::new("This is BibTeX", Self::info),
            Rule::new("The style", Self::info),
            Rule::new("Database", Self::info),
            Rule::new(r"(---)|(\(There were .*\))", Self::finish),
        ]
    }
}
