use regex::Captures;

use super::{Biber, Bibtex, Latex, Makeindex};
use crate::engine::{Delegated, Grammar, Rule, Scope};
use crate::ir::{Mark, Message, Outcome, Tool};

/// Where the latexmk parser is within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InCompilerRun,
    InBibRun,
    InIndexRun,
    RoundFinished,
}

/// Snapshot handed to the round callback in watch mode.
#[derive(Debug, Clone, Copy)]
pub struct RoundReport<'a> {
    /// 1-based count of completed rounds.
    pub round: usize,
    /// Runs seen so far, across all rounds.
    pub runs: usize,
    /// Counts since the most recent run boundary.
    pub outcome: Outcome,
    /// Counts across every round.
    pub total: Outcome,
    /// Marks of the latest compiler run.
    pub marks: &'a [Mark],
}

type RoundCallback<'c> = Box<dyn FnMut(&RoundReport<'_>) + 'c>;

/// Grammar for latexmk, which drives the other tools.
///
/// Each tool's output is recognized by its banner and handed to that tool's
/// parser over the same stream. The marks of the latest compiler run replace
/// earlier ones. Normally finishes on `Latexmk: Log file says output to`; in
/// watch mode (`latexmk -pvc`) that line ends a round instead and the parse
/// only stops when the stream closes.
pub struct Latexmk<'c> {
    master: String,
    on_round: Option<RoundCallback<'c>>,
    phase: Phase,
    runs: usize,
    rounds: usize,
}

impl<'c> Latexmk<'c> {
    pub fn new(master: impl Into<String>) -> Self {
        Self {
            master: master.into(),
            on_round: None,
            phase: Phase::Idle,
            runs: 0,
            rounds: 0,
        }
    }

    /// Never finish on the output marker; call `on_round` after each round.
    pub fn watch(mut self, on_round: impl FnMut(&RoundReport<'_>) + 'c) -> Self {
        self.on_round = Some(Box::new(on_round));
        self
    }

    pub fn is_watching(&self) -> bool {
        self.on_round.is_some()
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            log::debug!("latexmk: {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    fn sub_run<G: Grammar>(
        &mut self,
        scope: &mut Scope<'_, '_>,
        phase: Phase,
        banner: &str,
        grammar: G,
    ) -> Delegated<G> {
        self.enter(phase);
        scope.emit(Message::ToolStarted {
            tool: G::TOOL,
            banner: banner.trim().to_string(),
        });
        let delegated = scope.delegate(grammar);
        scope.emit(Message::ToolFinished { tool: G::TOOL });
        self.enter(Phase::Idle);
        delegated
    }

    fn start_latex(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        let grammar = Latex::new(self.master.as_str());
        let delegated = self.sub_run(scope, Phase::InCompilerRun, line, grammar);
        scope.state_mut().marks = delegated.state.marks;
    }

    fn start_bibtex(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        self.sub_run(scope, Phase::InBibRun, line, Bibtex);
    }

    fn start_biber(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        self.sub_run(scope, Phase::InBibRun, line, Biber::new());
    }

    fn start_makeindex(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        self.sub_run(scope, Phase::InIndexRun, line, Makeindex::new());
    }

    fn round_finished(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        scope.emit(Message::Latexmk {
            text: line.to_string(),
        });
        self.rounds += 1;
        self.enter(Phase::RoundFinished);

        let Some(on_round) = self.on_round.as_mut() else {
            scope.finish();
            return;
        };
        let state = scope.state();
        on_round(&RoundReport {
            round: self.rounds,
            runs: self.runs,
            outcome: state.run,
            total: state.total,
            marks: &state.marks,
        });
        self.enter(Phase::Idle);
    }

    fn chatter(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, line: &str) {
        scope.emit(Message::Latexmk {
            text: line.to_string(),
        });
    }

    fn new_run(&mut self, scope: &mut Scope<'_, '_>, _: &Captures<'_>, _: &str) {
        if self.runs > 0 {
            let run = scope.state().run;
            scope.emit(Message::RunSummary {
                run: self.runs,
                errors: run.errors,
                warnings: run.warnings,
            });
        }
        scope.state_mut().new_run();
        self.runs += 1;
        log::debug!("latexmk: run {}", self.runs);
    }
}

impl<'c> Grammar for Latexmk<'c> {
    const TOOL: Tool = Tool::Latexmk;

    fn rules(&self) -> Vec<Rule<Self>> {
        vec![
            Rule::new("This is (pdfTeX|latex2e|latex|LuaTeX|XeTeX)", Self::start_latex),
            Rule::new("This is BibTeX", Self::start_bibtex),
            Rule::new(".*This is Biber", Self::start_biber),
            Rule::new("Latexmk: Log file says output to", Self::round_finished),
            Rule::new("This is makeindex", Self::start_makeindex),
            Rule::new("Latexmk", Self::chatter),
            Rule::new("Run number", Self::new_run),
        ]
    }

    fn on_abnormal_end(&mut self, _scope: &mut Scope<'_, '_>) {
        if self.is_watching() {
            log::info!("latexmk stopped watching after {} rounds", self.rounds);
        }
    }
}
