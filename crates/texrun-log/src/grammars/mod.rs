//! Rule tables for each tool.

mod biber;
mod bibtex;
mod chktex;
mod latex;
mod latexmk;
mod makeglossaries;
mod makeindex;

pub use biber::Biber;
pub use bibtex::Bibtex;
pub use chktex::Chktex;
pub use latex::Latex;
pub use latexmk::{Latexmk, Phase, RoundReport};
pub use makeglossaries::Makeglossaries;
pub use makeindex::Makeindex;

use crate::engine::{Grammar, Parser, ParserState};
use crate::ir::{Mark, Outcome, Tool};
use crate::reader::LineReader;
use crate::sink::Sink;

/// Paths as TeX reports them, without a leading `./`.
fn normalize_path(path: &str) -> String {
    path.trim().trim_start_matches("./").to_string()
}

/// Parses a captured line number; TeX never reports line 0.
fn line_number(text: &str) -> u32 {
    text.parse().unwrap_or(1)
}

/// Counts and marks left by a complete parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub outcome: Outcome,
    /// For latexmk, only the marks of the last compiler run.
    pub marks: Vec<Mark>,
    /// Runs latexmk announced; one for every other tool.
    pub runs: usize,
}

fn run<G: Grammar>(
    reader: &mut LineReader<'_>,
    sink: &mut dyn Sink,
    grammar: G,
    verbose: bool,
) -> (G, ParserState) {
    let mut parser = Parser::new(reader, sink, grammar).verbose(verbose);
    parser.parse();
    parser.into_parts()
}

/// Parses a whole stream with the grammar for `tool`.
///
/// `master` names the document being built; only the latex and latexmk
/// grammars use it. Latexmk is parsed without watch mode.
pub fn parse_tool(
    tool: Tool,
    master: &str,
    reader: &mut LineReader<'_>,
    sink: &mut dyn Sink,
    verbose: bool,
) -> Report {
    let (state, runs) = match tool {
        Tool::Latex => (run(reader, sink, Latex::new(master), verbose).1, 1),
        Tool::Bibtex => (run(reader, sink, Bibtex, verbose).1, 1),
        Tool::Biber => (run(reader, sink, Biber::new(), verbose).1, 1),
        Tool::Makeindex => (run(reader, sink, Makeindex::new(), verbose).1, 1),
        Tool::Makeglossaries => (run(reader, sink, Makeglossaries::new(), verbose).1, 1),
        Tool::Chktex => (run(reader, sink, Chktex, verbose).1, 1),
        Tool::Latexmk => {
            let (grammar, state) = run(reader, sink, Latexmk::new(master), verbose);
            (state, grammar.runs().max(1))
        }
    };
    Report {
        outcome: state.outcome(),
        marks: state.marks,
        runs,
    }
}
