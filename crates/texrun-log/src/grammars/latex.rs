use std::path::Path;

use regex::{Captures, Regex};

use super::{line_number, normalize_path};
use crate::engine::{Grammar, Rule, Scope, anchored};
use crate::ir::{Location, Message, Tool};

/// Grammar for the TeX engines (pdfTeX, XeTeX, LuaTeX) run in file-line-error mode.
///
/// Tracks the source file the engine is reading so that warnings reported
/// only by line number can be attributed.
pub struct Latex {
    master: String,
    extension: String,
    log_file: String,
    input_line: Regex,
}

impl Latex {
    /// `master` is the document being typeset, e.g. `thesis.tex`.
    pub fn new(master: impl Into<String>) -> Self {
        let master = master.into();
        let path = Path::new(&master);
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tex".to_string());
        let log_file = path
            .with_extension("log")
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "texput.log".to_string());
        Self {
            master: normalize_path(&master),
            extension,
            log_file,
            input_line: anchored(r".*?input line (\d+)(?:\.|$)"),
        }
    }

    pub fn log_file(&self) -> &str {
        &self.log_file
    }

    fn current_file(&self, scope: &Scope<'_, '_>) -> String {
        scope
            .state()
            .current_file
            .clone()
            .unwrap_or_else(|| self.master.clone())
    }

    fn info(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        scope.info(line);
    }

    fn file_entered(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, _: &str) {
        let path = normalize_path(&caps[1]);
        scope.state_mut().current_file = Some(path.clone());
        scope.emit(Message::FileEntered { path });
    }

    fn include(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, _: &str) {
        scope.emit(Message::Include {
            path: caps[1].to_string(),
        });
    }

    fn located_warning(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, line: &str) {
        let location = Location::new(self.current_file(scope), line_number(&caps[1]));
        scope.located_warning(line, location);
    }

    /// A warning whose `input line N` may have been pushed onto the next line.
    ///
    /// The next physical line is consumed either way. When it does not carry
    /// the line number it is dropped, which loses whatever it said.
    fn wrapped_warning(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        let Some(next) = scope.read_physical() else {
            scope.warning(line);
            return;
        };
        let joined = format!("{line} {next}");
        let number = self.input_line.captures(&next).map(|caps| line_number(&caps[1]));
        match number {
            Some(number) => {
                let location = Location::new(self.current_file(scope), number);
                scope.located_warning(&joined, location);
            }
            None => {
                log::debug!("discarding line after warning: {next:?}");
                scope.warning(line);
            }
        }
    }

    fn format_warning(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        scope.emit(Message::FormatWarning {
            text: line.to_string(),
        });
    }

    fn located_error(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, _: &str) {
        let description = caps[3].trim();
        let location = Location::new(normalize_path(&caps[1]), line_number(&caps[2]));
        scope.located_error(description, location);
        if description.contains("Fatal error") {
            scope.state_mut().flag_fatal();
        }
    }

    fn runaway_argument(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        scope.error(line);
        match scope.read_physical() {
            Some(next) if next.starts_with(" ==> Fatal error occurred") => {
                scope.emit(Message::Fatal {
                    text: next.trim().to_string(),
                });
                scope.state_mut().flag_fatal();
            }
            Some(next) => scope.emit(Message::Excerpt { lines: vec![next] }),
            None => {}
        }
    }

    fn transcript_written(&mut self, scope: &mut Scope<'_, '_>, caps: &Captures<'_>, _: &str) {
        scope.emit(Message::Transcript {
            path: caps[2].trim_matches('"').to_string(),
        });
        scope.finish();
    }

    fn bang_line(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        if line.contains("Error") || line.contains("error") {
            scope.error(line);
        } else {
            scope.warning(line);
        }
    }

    fn fatal(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        scope.fatal(line);
    }
}

impl Grammar for Latex {
    const TOOL: Tool = Tool::Latex;

    fn rules(&self) -> Vec<Rule<Self>> {
        let ext = regex::escape(&self.extension);
        vec![
            Rule::new("Document Class", Self::info),
            Rule::new(
                &format!(r".*?\(\./([^)]*?\.(?:tex|{ext})(?: |$))"),
                Self::file_entered,
            ),
            Rule::new(r".*<use (.*?)>", Self::include),
            Rule::new("Output written", Self::info),
            Rule::new(r"LaTeX Warning:.*?input line (\d+)(?:\.|$)", Self::located_warning),
            Rule::new("LaTeX Warning:.*", Self::wrapped_warning),
            Rule::new(".*pdfTeX warning.*", Self::wrapped_warning),
            Rule::new("LaTeX Font Warning:.*", Self::wrapped_warning),
            Rule::new("Overfull.*wide", Self::format_warning),
            Rule::new("Underfull.*badness", Self::format_warning),
            Rule::new(
                &format!(r"([\w./\-\x{{80}}-\x{{10FFFF}}]+(?:\.sty|\.tex|\.{ext})):(\d+):\s+(.*)"),
                Self::located_error,
            ),
            Rule::new(r"([^:]*):(\d+): LaTeX Error:(.*)", Self::located_error),
            Rule::new(r"([^:]*):(\d+): (Emergency stop)", Self::located_error),
            Rule::new("Runaway argument", Self::runaway_argument),
            Rule::new(r"(.*)Transcript written on (.*)\.$", Self::transcript_written),
            Rule::new("!.*", Self::bang_line),
            Rule::new(r"\s+==>", Self::fatal),
        ]
    }

    fn on_abnormal_end(&mut self, scope: &mut Scope<'_, '_>) {
        scope.emit(Message::AbnormalTermination {
            log: self.log_file.clone(),
        });
    }
}
