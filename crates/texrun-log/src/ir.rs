use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The external programs whose output can be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Latex,
    Bibtex,
    Biber,
    Makeindex,
    Makeglossaries,
    Chktex,
    Latexmk,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::Latex,
        Tool::Bibtex,
        Tool::Biber,
        Tool::Makeindex,
        Tool::Makeglossaries,
        Tool::Chktex,
        Tool::Latexmk,
    ];

    /// Lowercase name, as accepted by [`Tool::from_str`].
    pub fn name(self) -> &'static str {
        match self {
            Tool::Latex => "latex",
            Tool::Bibtex => "bibtex",
            Tool::Biber => "biber",
            Tool::Makeindex => "makeindex",
            Tool::Makeglossaries => "makeglossaries",
            Tool::Chktex => "chktex",
            Tool::Latexmk => "latexmk",
        }
    }

    /// Name as the tool spells itself in its banner.
    pub fn display_name(self) -> &'static str {
        match self {
            Tool::Latex => "LaTeX",
            Tool::Bibtex => "BibTeX",
            Tool::Biber => "Biber",
            Tool::Makeindex => "Makeindex",
            Tool::Makeglossaries => "Make Glossaries",
            Tool::Chktex => "ChkTeX",
            Tool::Latexmk => "Latexmk",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownTool(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A position in a source file, 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// A gutter annotation: one located error or warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub file: String,
    pub line: u32,
    pub severity: Severity,
    pub message: String,
}

/// Final classification of a parsed stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub fatal: bool,
    pub errors: usize,
    pub warnings: usize,
}

impl Outcome {
    pub fn new(fatal: bool, errors: usize, warnings: usize) -> Self {
        Self {
            fatal,
            errors,
            warnings,
        }
    }

    pub fn is_clean(&self) -> bool {
        !self.fatal && self.errors == 0 && self.warnings == 0
    }

    /// Adds another outcome's counts; fatal flags are OR-ed.
    pub fn absorb(&mut self, other: Outcome) {
        self.fatal |= other.fatal;
        self.errors += other.errors;
        self.warnings += other.warnings;
    }
}

/// Everything a parser writes to its [`Sink`](crate::sink::Sink).
///
/// Handlers never format text themselves; rendering is the sink's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum Message {
    Info {
        text: String,
    },
    Warning {
        text: String,
        location: Option<Location>,
    },
    Error {
        text: String,
        location: Option<Location>,
    },
    Fatal {
        text: String,
    },
    /// Overfull/underfull box notices. Shown, never counted.
    FormatWarning {
        text: String,
    },
    /// An unmatched line echoed in verbose mode.
    Verbatim {
        text: String,
    },
    /// Source lines quoted by the tool, echoed as-is.
    Excerpt {
        lines: Vec<String>,
    },
    /// Chatter from latexmk itself.
    Latexmk {
        text: String,
    },
    ToolStarted {
        tool: Tool,
        banner: String,
    },
    ToolFinished {
        tool: Tool,
    },
    ToolVersion {
        tool: Tool,
        version: String,
    },
    FileEntered {
        path: String,
    },
    Include {
        path: String,
    },
    Progress {
        description: String,
        file: String,
        status: String,
    },
    Sorting {
        status: String,
    },
    /// A file the tool produced, e.g. `Output written in main.ind.`
    Artifact {
        description: String,
        path: String,
    },
    Transcript {
        path: String,
    },
    GlossaryType {
        name: String,
        files: String,
    },
    XindyRun {
        glossary: String,
        language: String,
    },
    GlossaryFinished {
        name: String,
        path: String,
    },
    /// The stream ended before the tool reported completion.
    AbnormalTermination {
        log: String,
    },
    RunSummary {
        run: usize,
        errors: usize,
        warnings: usize,
    },
    Summary {
        outcome: Outcome,
        runs: usize,
    },
}
