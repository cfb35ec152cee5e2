use std::collections::HashMap;

use regex::Captures;

use super::Makeindex;
use crate::engine::{Grammar, Rule, Scope};
use crate::ir::{Message, Tool};

/// File extensions makeglossaries feeds to makeindex.
const GLOSSARY_EXTENSIONS: [&str; 7] = ["idx", "ind", "acn", "acr", "ist", "glo", "gls"];

/// Grammar for makeglossaries.
///
/// Learns which file extension belongs to which glossary type from the
/// `added glossary type` lines, hands every makeindex invocation to a nested
/// [`Makeindex`] parser, and reports xindy runs by glossary type. There is
/// no terminator; the parse ends with the stream.
#[derive(Debug, Default, Clone)]
pub struct Makeglossaries {
    types: HashMap<String, String>,
    makeindex_runs: usize,
}

impl Makeglossaries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Glossary type registered for a file extension.
    pub fn glossary_type(&self, extension: &str) -> Option<&str> {
        self.types.get(extension).map(String::as_str)
    }

    pub fn makeindex_runs(&self) -> usize {
        self.makeindex_runs
    }

    fn type_for_extension(&self, extension: &str) -> String {
        match self.glossary_type(extension) {
            Some(name) => name.to_string(),
            None => {
                log::warn!("no glossary type registered for `.{extension}` files");
                extension.to_string()
            }
        }
    }

    fn version(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, _: &str) {
        scope.emit(Message::ToolVersion {
            tool: Tool::Makeglossaries,
            version: caps[1].trim().to_string(),
        });
    }

    fn add_type(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, _: &str) {
        let name = caps[1].to_string();
        let files = caps[2].to_string();
        for extension in files.split(',') {
            self.types.insert(extension.trim().to_string(), name.clone());
        }
        scope.emit(Message::GlossaryType { name, files });
    }

    fn makeindex(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, _: &str) {
        scope.emit(Message::ToolVersion {
            tool: Tool::Makeindex,
            version: caps[1].to_string(),
        });
        self.makeindex_runs += 1;
        scope.delegate(Makeindex::with_extensions(GLOSSARY_EXTENSIONS));
    }

    fn progress(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, _: &str) {
        scope.emit(Message::Progress {
            description: caps[1].to_string(),
            file: caps[2].to_string(),
            status: caps[3].to_string(),
        });
    }

    fn written(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, _: &str) {
        scope.emit(Message::Artifact {
            description: caps[1].to_string(),
            path: caps[2].to_string(),
        });
    }

    fn markup_written(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, _: &str) {
        let path = caps[1].to_string();
        let extension = path.rsplit_once('.').map_or(path.as_str(), |(_, ext)| ext);
        let name = self.type_for_extension(extension);
        scope.emit(Message::GlossaryFinished { name, path });
    }

    fn xindy(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, _: &str) {
        let language = caps[1].to_string();
        let glossary = self.type_for_extension(&caps[2]);
        scope.emit(Message::XindyRun { glossary, language });
    }

    fn info(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        scope.info(line);
    }

    fn warning(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        scope.warning(line);
    }

    fn error(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        scope.error(line);
    }
}

impl Grammar for Makeglossaries {
    const TOOL: Tool = Tool::Makeglossaries;

    fn rules(&self) -> Vec<Rule<Self>> {
        vec![
            Rule::new(r"This is makeindex, version (\d+\.\d+)", Self::makeindex),
            Rule::new(".*makeglossaries version (.*)$", Self::version),
            Rule::new(r".*added glossary type '(.*)' \((.*)\).*$", Self::add_type),
            Rule::new(
                r"(\w+ \w+ file) (?:\./)?(.*\.(?:acr|ist|glo|gls)).*\((.*)\)",
                Self::progress,
            ),
            Rule::new(r"(\w+ written in) (.*)\.$", Self::written),
            Rule::new(r#".*Markup written into file "(.*)".$"#, Self::markup_written),
            Rule::new(r#".*xindy.*-L (.*) -I.*-t ".*\.(.*)" -o.*$"#, Self::xindy),
            Rule::new("Cannot locate xindy module", Self::warning),
            Rule::new("ERROR", Self::error),
            Rule::new("Warning", Self::warning),
            Rule::new(r"\*\*\*", Self::info),
        ]
    }
}
