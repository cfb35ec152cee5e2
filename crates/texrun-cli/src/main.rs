use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser as _, Subcommand};
use texrun_log::grammars::{Latexmk, RoundReport, parse_tool};
use texrun_log::gutter::MarkLedger;
use texrun_log::ir::{Mark, Message, Outcome, Tool};
use texrun_log::{HtmlWriter, JsonLines, LineReader, Linker, Parser, Sink};

mod settings;

use settings::{Format, Settings};

#[derive(clap::Parser)]
#[command(name = "texrun")]
#[command(about = "Parse the console output of TeX tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a tool transcript and render its errors and warnings
    Parse(ParseArgs),
}

#[derive(Args)]
struct ParseArgs {
    /// Tool that produced the transcript
    #[arg(long, default_value = "latexmk")]
    tool: Tool,

    /// Document being built; defaults to the transcript's name with a .tex extension
    #[arg(long, value_name = "FILE")]
    master: Option<String>,

    /// Echo lines that match no rule
    #[arg(long)]
    verbose: bool,

    /// Keep parsing latexmk -pvc output across rounds until the stream closes
    #[arg(long)]
    watch: bool,

    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Gutter-mark ledger; the mark update is written to stderr as JSON
    #[arg(long, value_name = "FILE")]
    marks: Option<PathBuf>,

    /// JSON settings file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Path to the transcript, or `-` for stdin
    #[arg(value_name = "LOG", default_value = "-")]
    path: PathBuf,
}

/// Ledger of marked files, saved after every update.
struct Gutter {
    ledger: MarkLedger,
    path: PathBuf,
}

impl Gutter {
    fn open(path: PathBuf) -> Self {
        Self {
            ledger: MarkLedger::load_from_path(&path),
            path,
        }
    }

    fn publish(&mut self, marks: &[Mark]) {
        let update = self.ledger.update(marks);
        if let Err(e) = self.ledger.save_to_path(&self.path) {
            log::warn!("{e}");
        }
        match serde_json::to_string(&update) {
            Ok(json) => eprintln!("{json}"),
            Err(e) => log::warn!("Failed to encode mark update: {e}"),
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse(args) => parse(args),
    }
}

fn parse(args: ParseArgs) -> anyhow::Result<ExitCode> {
    let mut settings = args
        .config
        .as_deref()
        .map(Settings::load_from_path)
        .unwrap_or_default();
    settings.verbose |= args.verbose;
    if let Some(format) = args.format {
        settings.format = format;
    }
    if let Some(marks) = args.marks.clone() {
        settings.marks_cache = Some(marks);
    }

    let master = args
        .master
        .clone()
        .unwrap_or_else(|| default_master(&args.path));
    let mut reader = if args.path == Path::new("-") {
        LineReader::new(io::stdin().lock())
    } else {
        let file = File::open(&args.path)
            .with_context(|| format!("Failed to open {}", args.path.display()))?;
        LineReader::new(BufReader::new(file))
    };

    let root = std::env::current_dir().context("Failed to resolve working directory")?;
    let linker = Linker::new(&settings.link_scheme)?.with_root(root);
    let stdout = io::stdout().lock();
    let mut sink: Box<dyn Sink> = match settings.format {
        Format::Html => Box::new(HtmlWriter::new(stdout, linker)),
        Format::Json => Box::new(JsonLines::new(stdout)),
    };
    let mut gutter = settings.marks_cache.clone().map(Gutter::open);

    let watch = args.watch && args.tool == Tool::Latexmk;
    if args.watch && !watch {
        log::warn!("--watch only applies to latexmk output; ignoring it for {}", args.tool);
    }

    let (outcome, runs) = if watch {
        let grammar = Latexmk::new(master).watch(|round: &RoundReport<'_>| {
            log::info!(
                "round {} finished: {} errors, {} warnings",
                round.round,
                round.outcome.errors,
                round.outcome.warnings
            );
            if let Some(gutter) = gutter.as_mut() {
                gutter.publish(round.marks);
            }
        });
        let mut parser = Parser::new(&mut reader, sink.as_mut(), grammar).verbose(settings.verbose);
        let outcome = parser.parse();
        let runs = parser.grammar().runs().max(1);
        (outcome, runs)
    } else {
        let report = parse_tool(args.tool, &master, &mut reader, sink.as_mut(), settings.verbose);
        if let Some(gutter) = gutter.as_mut() {
            gutter.publish(&report.marks);
        }
        (report.outcome, report.runs)
    };

    sink.emit(Message::Summary { outcome, runs });
    Ok(exit_code(outcome))
}

/// `paper.log` is the transcript of `paper.tex`.
fn default_master(log: &Path) -> String {
    match log.file_stem() {
        Some(stem) if log != Path::new("-") => format!("{}.tex", stem.to_string_lossy()),
        _ => "texput.tex".to_string(),
    }
}

/// 0 when clean, 1 for warnings only, 2 for errors, 3 after a fatal error.
fn exit_code(outcome: Outcome) -> ExitCode {
    if outcome.fatal {
        ExitCode::from(3)
    } else if outcome.errors > 0 {
        ExitCode::from(2)
    } else if outcome.warnings > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
