use regex::Captures;

use crate::engine::{Grammar, Rule, Scope};
use crate::ir::{Message, Tool};

/// Grammar for makeindex. Finishes on `Transcript written in <file>.`
#[derive(Debug, Clone)]
pub struct Makeindex {
    extensions: Vec<String>,
}

impl Default for Makeindex {
    fn default() -> Self {
        Self::new()
    }
}

impl Makeindex {
    pub fn new() -> Self {
        Self::with_extensions(["idx", "ind"])
    }

    /// Report progress for files with these extensions (without the dot).
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    fn version(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, _: &str) {
        scope.emit(Message::ToolVersion {
            tool: Tool::Makeindex,
            version: caps[1].to_string(),
        });
    }

    fn progress(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, _: &str) {
        scope.emit(Message::Progress {
            description: caps[1].to_string(),
            file: caps[2].to_string(),
            status: caps[3].to_string(),
        });
    }

    fn sorting(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, _: &str) {
        scope.emit(Message::Sorting {
            status: caps[1].to_string(),
        });
    }

    fn written(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, _: &str) {
        scope.emit(Message::Artifact {
            description: caps[1].to_string(),
            path: caps[2].to_string(),
        });
    }

    fn transcript_written(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, line: &str) {
        self.written(scope, caps, line);
        scope.finish();
    }
}

impl Grammar for Makeindex {
    const TOOL: Tool = Tool::Makeindex;

    fn rules(&self) -> Vec<Rule<Self>> {
        let extensions = self
            .extensions
            .iter()
            .map(|ext| regex::escape(ext))
            .collect::<Vec<_>>()
            .join("|");
        vec![
            Rule::new(r"This is makeindex, version (\d+\.\d+)", Self::version),
            Rule::new(
                &format!(r"(\w+ \w+ file) (?:\./)?(.*\.(?:{extensions})).*\((.*)\)"),
                Self::progress,
            ),
            Rule::new(r"Sorting entries.*\((.*)\)", Self::sorting),
            Rule::new(r"(Transcript written in) (.*)\.$", Self::transcript_written),
            Rule::new(r"(\w+ written in) (.*)\.$", Self::written),
        ]
    }
}
