//! The pattern dispatch engine shared by every tool grammar.
//!
//! A [`Parser`] pulls statements from a [`LineReader`], tries the grammar's
//! [`Rule`]s in order and runs the first matching handler. Handlers act
//! through a [`Scope`], which gives them the sink, the counters and, for
//! delegation, the reader itself.

use regex::{Captures, Regex};

use crate::ir::{Location, Mark, Message, Outcome, Severity, Tool};
use crate::reader::LineReader;
use crate::sink::Sink;

/// Callback run when a rule matches: `(grammar, scope, captures, line)`.
pub type Handler<G> = fn(&mut G, &mut Scope<'_, '_>, &Captures<'_>, &str);

/// Compiles `source` anchored at the start of the line.
///
/// # Panics
///
/// Panics if `source` is not a valid pattern. Rule tables are built from
/// literals, so this only fires on a programming error.
pub fn anchored(source: &str) -> Regex {
    Regex::new(&format!("^(?:{source})"))
        .unwrap_or_else(|e| panic!("invalid rule pattern {source:?}: {e}"))
}

/// One entry of a dispatch table.
pub struct Rule<G> {
    pattern: Regex,
    handler: Handler<G>,
}

impl<G> Rule<G> {
    /// Rule matching `pattern` at the start of a line. See [`anchored`].
    pub fn new(pattern: &str, handler: Handler<G>) -> Self {
        Self {
            pattern: anchored(pattern),
            handler,
        }
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// A tool's message grammar: its ordered rule table plus per-tool state.
pub trait Grammar: Sized {
    const TOOL: Tool;

    /// Rules in priority order; the first match wins.
    fn rules(&self) -> Vec<Rule<Self>>;

    /// Runs when the stream ends before a rule called [`Scope::finish`].
    fn on_abnormal_end(&mut self, _scope: &mut Scope<'_, '_>) {}
}

/// Counters and marks owned by one parser instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParserState {
    pub done: bool,
    /// Counts since the last run boundary.
    pub run: Outcome,
    /// Counts across every run this parser saw.
    pub total: Outcome,
    pub current_file: Option<String>,
    pub marks: Vec<Mark>,
}

impl ParserState {
    pub fn outcome(&self) -> Outcome {
        self.total
    }

    pub fn add_error(&mut self) {
        self.run.errors += 1;
        self.total.errors += 1;
    }

    pub fn add_warning(&mut self) {
        self.run.warnings += 1;
        self.total.warnings += 1;
    }

    /// Raises the fatal flag without counting another error.
    pub fn flag_fatal(&mut self) {
        self.run.fatal = true;
        self.total.fatal = true;
    }

    /// Folds a finished sub-parse into this parser's counts.
    pub fn absorb(&mut self, nested: Outcome) {
        self.run.absorb(nested);
        self.total.absorb(nested);
    }

    /// Starts a new run: per-run counts drop to zero, totals are kept.
    pub fn new_run(&mut self) {
        self.run = Outcome::default();
    }
}

/// What a handler sees while it runs.
pub struct Scope<'a, 'r> {
    reader: &'a mut LineReader<'r>,
    sink: &'a mut dyn Sink,
    state: &'a mut ParserState,
    verbose: bool,
}

impl Scope<'_, '_> {
    pub fn emit(&mut self, message: Message) {
        self.sink.emit(message);
    }

    pub fn state(&self) -> &ParserState {
        self.state
    }

    pub fn state_mut(&mut self) -> &mut ParserState {
        self.state
    }

    /// Stops the parse after the current handler returns.
    pub fn finish(&mut self) {
        self.state.done = true;
    }

    /// Reads the next raw line, bypassing line reassembly.
    pub fn read_physical(&mut self) -> Option<String> {
        self.reader.next_physical()
    }

    pub fn info(&mut self, line: &str) {
        self.emit(Message::Info {
            text: line.to_string(),
        });
    }

    pub fn warning(&mut self, line: &str) {
        self.emit(Message::Warning {
            text: line.to_string(),
            location: None,
        });
        self.state.add_warning();
    }

    pub fn error(&mut self, line: &str) {
        self.emit(Message::Error {
            text: line.to_string(),
            location: None,
        });
        self.state.add_error();
    }

    /// A fatal message counts as an error as well.
    pub fn fatal(&mut self, line: &str) {
        self.emit(Message::Fatal {
            text: line.to_string(),
        });
        self.state.add_error();
        self.state.flag_fatal();
    }

    pub fn located_warning(&mut self, text: &str, location: Location) {
        self.located(Severity::Warning, text, location);
        self.state.add_warning();
    }

    pub fn located_error(&mut self, text: &str, location: Location) {
        self.located(Severity::Error, text, location);
        self.state.add_error();
    }

    fn located(&mut self, severity: Severity, text: &str, location: Location) {
        self.state.marks.push(Mark {
            file: location.file.clone(),
            line: location.line,
            severity,
            message: text.to_string(),
        });
        let text = text.to_string();
        let location = Some(location);
        self.emit(match severity {
            Severity::Error => Message::Error { text, location },
            Severity::Warning => Message::Warning { text, location },
        });
    }

    /// Hands the stream to a nested parser until it finishes.
    ///
    /// The nested parser reads from the same [`LineReader`] and writes to the
    /// same sink; this parser reads nothing until it returns. Its counts are
    /// folded into this parser's state even when it ran off the end of the
    /// stream.
    pub fn delegate<G: Grammar>(&mut self, grammar: G) -> Delegated<G> {
        log::debug!("handing stream to {} parser", G::TOOL);
        let mut nested = Parser::new(&mut *self.reader, &mut *self.sink, grammar)
            .verbose(self.verbose);
        let outcome = nested.parse();
        let (grammar, state) = nested.into_parts();
        log::debug!(
            "{} parser returned {outcome:?} (finished: {})",
            G::TOOL,
            state.done
        );
        self.state.absorb(outcome);
        Delegated {
            outcome,
            grammar,
            state,
        }
    }
}

/// Result of a [`Scope::delegate`] call.
pub struct Delegated<G> {
    pub outcome: Outcome,
    pub grammar: G,
    pub state: ParserState,
}

/// Runs a [`Grammar`] over a stream.
///
/// ```
/// use texrun_log::{LineReader, Parser, grammars::Bibtex, ir::{Message, Outcome}};
///
/// let log = "This is BibTeX, Version 0.99d\nWarning--empty year in knuth84\n(There were 1 warning)\n";
/// let mut reader = LineReader::from_text(log);
/// let mut messages: Vec<Message> = Vec::new();
/// let outcome = Parser::new(&mut reader, &mut messages, Bibtex).parse();
/// assert_eq!(outcome, Outcome::new(false, 0, 1));
/// ```
pub struct Parser<'a, 'r, G: Grammar> {
    reader: &'a mut LineReader<'r>,
    sink: &'a mut dyn Sink,
    grammar: G,
    rules: Vec<Rule<G>>,
    state: ParserState,
    verbose: bool,
}

impl<'a, 'r, G: Grammar> Parser<'a, 'r, G> {
    pub fn new(reader: &'a mut LineReader<'r>, sink: &'a mut dyn Sink, grammar: G) -> Self {
        let rules = grammar.rules();
        Self {
            reader,
            sink,
            grammar,
            rules,
            state: ParserState::default(),
            verbose: false,
        }
    }

    /// Echo lines that match no rule.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Consumes statements until a rule finishes the parse or the stream ends.
    ///
    /// Always returns the accumulated counts; running out of input before the
    /// tool's terminator calls [`Grammar::on_abnormal_end`] exactly once.
    pub fn parse(&mut self) -> Outcome {
        while !self.state.done {
            let Some(line) = self.reader.next_logical() else {
                break;
            };
            self.dispatch(&line);
        }
        if !self.state.done {
            log::debug!("{} output ended without its terminator", G::TOOL);
            let mut scope = Scope {
                reader: &mut *self.reader,
                sink: &mut *self.sink,
                state: &mut self.state,
                verbose: self.verbose,
            };
            self.grammar.on_abnormal_end(&mut scope);
        }
        self.state.outcome()
    }

    fn dispatch(&mut self, line: &str) {
        let mut scope = Scope {
            reader: &mut *self.reader,
            sink: &mut *self.sink,
            state: &mut self.state,
            verbose: self.verbose,
        };
        for rule in &self.rules {
            if let Some(captures) = rule.pattern.captures(line) {
                (rule.handler)(&mut self.grammar, &mut scope, &captures, line);
                return;
            }
        }
        if self.verbose {
            scope.emit(Message::Verbatim {
                text: line.to_string(),
            });
        }
    }

    pub fn grammar(&self) -> &G {
        &self.grammar
    }

    pub fn marks(&self) -> &[Mark] {
        &self.state.marks
    }

    pub fn into_parts(self) -> (G, ParserState) {
        (self.grammar, self.state)
    }
}
