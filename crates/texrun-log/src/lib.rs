//! # texrun log parsers
//!
//! Streaming parsers for the console output of a TeX toolchain: the TeX
//! engines, BibTeX, Biber, makeindex, makeglossaries, ChkTeX and latexmk.
//!
//! ## Overview
//!
//! None of these tools emit structured diagnostics. Their output is free-form,
//! hard-wrapped at 79 columns, and interleaved: latexmk's stream contains the
//! complete output of every engine and bibliography run it starts. This crate
//! turns such a stream into:
//!
//! - a sequence of typed [`Message`](ir::Message)s (info, warnings, errors,
//!   links to produced files) written to a [`Sink`](sink::Sink),
//! - a final [`Outcome`](ir::Outcome): fatal flag, error and warning counts,
//! - [`Mark`](ir::Mark)s locating errors and warnings in source files.
//!
//! ## Architecture
//!
//! ```text
//! stream ──► LineReader ──► Parser<G> ──► first matching Rule<G> ──► handler
//!            (rewrapping)   (dispatch)                               │
//!                 ▲                                                  ├─► Sink
//!                 └──── Scope::delegate(nested grammar) ◄────────────┤
//!                                                                    └─► ParserState
//! ```
//!
//! - [`LineReader`](reader::LineReader) rejoins lines TeX broke at the
//!   terminal width.
//! - [`Parser`](engine::Parser) is the dispatch engine: it tries the rules of
//!   a [`Grammar`](engine::Grammar) in order and runs the first match.
//! - [`grammars`] holds one rule table per tool.
//! - A handler may hand the stream to a nested parser with
//!   [`Scope::delegate`](engine::Scope::delegate); the outer parser resumes
//!   when the nested one finishes and adds its counts to its own.
//!
//! ## Example
//!
//! ```
//! use texrun_log::{LineReader, Parser, grammars::Latex, ir::{Message, Outcome}};
//!
//! let log = "This is pdfTeX, Version 3.14159265\n\
//!            ./file.tex:10: Undefined control sequence.\n\
//!            Transcript written on file.log.\n";
//! let mut reader = LineReader::from_text(log);
//! let mut messages: Vec<Message> = Vec::new();
//! let mut parser = Parser::new(&mut reader, &mut messages, Latex::new("file.tex"));
//!
//! assert_eq!(parser.parse(), Outcome::new(false, 1, 0));
//! assert_eq!(parser.marks()[0].line, 10);
//! ```

pub mod engine;
pub mod error;
pub mod grammars;
pub mod gutter;
/// Typed messages, marks and outcomes.
pub mod ir;
pub mod reader;
pub mod sink;


pub use engine::{Grammar, Parser, ParserState, Rule, Scope};
pub use error::{Error, Result};
pub use reader::LineReader;
pub use sink::{HtmlWriter, JsonLines, Linker, Sink};
