use texrun_log::grammars::{Latexmk, Phase};
use texrun_log::ir::{Message, Outcome, Severity, Tool};
use texrun_log::{LineReader, Parser};

fn started(messages: &[Message]) -> Vec<Tool> {
    messages
        .iter()
        .filter_map(|m| match m {
            Message::ToolStarted { tool, .. } => Some(*tool),
            _ => None,
        })
        .collect()
}

#[test]
fn test_latexmk_delegates_each_tool() {
    let mut reader = LineReader::from_text(include_str!("fixtures/latexmk.log"));
    let mut messages: Vec<Message> = Vec::new();
    let mut parser = Parser::new(&mut reader, &mut messages, Latexmk::new("paper.tex"));

    assert_eq!(parser.parse(), Outcome::new(false, 3, 3));
    assert_eq!(parser.grammar().runs(), 3);
    assert_eq!(parser.grammar().rounds(), 1);
    assert_eq!(parser.grammar().phase(), Phase::RoundFinished);

    // Only the last compiler run's marks survive.
    let marks = parser.marks();
    assert_eq!(marks.len(), 1);
    assert_eq!((marks[0].file.as_str(), marks[0].line), ("paper.tex", 9));
    assert_eq!(marks[0].severity, Severity::Error);
    drop(parser);

    assert_eq!(started(&messages), vec![Tool::Latex, Tool::Bibtex, Tool::Latex]);
    let summaries: Vec<_> = messages
        .iter()
        .filter_map(|m| match m {
            Message::RunSummary {
                run,
                errors,
                warnings,
            } => Some((*run, *errors, *warnings)),
            _ => None,
        })
        .collect();
    assert_eq!(summaries, vec![(1, 0, 1), (2, 2, 2)]);
    assert_eq!(
        messages.last(),
        Some(&Message::Latexmk {
            text: "Latexmk: Log file says output to 'paper.pdf'".to_string()
        })
    );
}

#[test]
fn test_latexmk_biber_and_makeindex_runs() {
    let input = "Run number 1 of rule 'biber paper'\n\
                 INFO - This is Biber 2.19\n\
                 WARN - Duplicate entry key 'knuth84' in file 'refs.bib', skipping ...\n\
                 INFO - Output to paper.bbl\n\
                 Run number 1 of rule 'makeindex paper.idx'\n\
                 This is makeindex, version 2.16 [TeX Live 2023] (kpathsea + Thai support).\n\
                 Scanning input file paper.idx....done (4 entries accepted, 0 rejected).\n\
                 Transcript written in paper.ilg.\n";
    let mut reader = LineReader::from_text(input);
    let mut messages: Vec<Message> = Vec::new();
    let mut parser = Parser::new(&mut reader, &mut messages, Latexmk::new("paper.tex"));

    assert_eq!(parser.parse(), Outcome::new(false, 0, 1));
    assert_eq!(parser.grammar().runs(), 2);
    assert_eq!(parser.grammar().phase(), Phase::Idle);
    drop(parser);

    assert_eq!(started(&messages), vec![Tool::Biber, Tool::Makeindex]);
    assert!(messages.contains(&Message::Transcript {
        path: "paper.blg".to_string()
    }));
    assert!(messages.contains(&Message::Progress {
        description: "Scanning input file".to_string(),
        file: "paper.idx".to_string(),
        status: "4 entries accepted, 0 rejected".to_string()
    }));
}

#[test]
fn test_run_markers_without_output() {
    let input = "Run number 1 of rule 'pdflatex'\nRun number 2 of rule 'pdflatex'\n";
    let mut reader = LineReader::from_text(input);
    let mut messages: Vec<Message> = Vec::new();
    let mut parser = Parser::new(&mut reader, &mut messages, Latexmk::new("paper.tex"));

    assert!(parser.parse().is_clean());
    assert_eq!(parser.grammar().runs(), 2);
    drop(parser);
    assert_eq!(
        messages,
        vec![Message::RunSummary {
            run: 1,
            errors: 0,
            warnings: 0
        }]
    );
}

#[test]
fn test_watch_mode_reports_every_round() {
    let input = "Latexmk: applying rule 'pdflatex'...\n\
                 Run number 1 of rule 'pdflatex'\n\
                 This is pdfTeX, Version 3.14159265\n\
                 (./paper.tex\n\
                 ./paper.tex:3: Undefined control sequence.\n\
                 Transcript written on paper.log.\n\
                 Latexmk: Log file says output to 'paper.pdf'\n\
                 === Watching for updated files. Use ctrl/C to stop ...\n\
                 Run number 1 of rule 'pdflatex'\n\
                 This is pdfTeX, Version 3.14159265\n\
                 (./paper.tex\n\
                 Transcript written on paper.log.\n\
                 Latexmk: Log file says output to 'paper.pdf'\n\
                 === Watching for updated files. Use ctrl/C to stop ...\n";
    let mut reader = LineReader::from_text(input);
    let mut messages: Vec<Message> = Vec::new();
    let mut reports = Vec::new();

    let (outcome, runs, rounds) = {
        let grammar = Latexmk::new("paper.tex").watch(|report| {
            reports.push((report.round, report.runs, report.outcome, report.marks.len()));
        });
        assert!(grammar.is_watching());
        let mut parser = Parser::new(&mut reader, &mut messages, grammar);
        let outcome = parser.parse();
        let (grammar, _) = parser.into_parts();
        (outcome, grammar.runs(), grammar.rounds())
    };

    assert_eq!(outcome, Outcome::new(false, 1, 0));
    assert_eq!((runs, rounds), (2, 2));
    assert_eq!(
        reports,
        vec![
            (1, 1, Outcome::new(false, 1, 0), 1),
            (2, 2, Outcome::new(false, 0, 0), 0),
        ]
    );
    assert!(
        !messages
            .iter()
            .any(|m| matches!(m, Message::AbnormalTermination { .. }))
    );
}

#[test]
fn test_nested_bibtex_counts_are_merged_once() {
    let input = "Latexmk: applying rule 'bibtex paper'...\n\
                 Run number 1 of rule 'bibtex paper'\n\
                 This is BibTeX, Version 0.99d (TeX Live 2023)\n\
                 Warning--empty year in knuth84\n\
                 Warning--empty journal in lamport94\n\
                 I couldn't open style file fancy.bst\n\
                 (There were 1 error message)\n\
                 Run number 1 of rule 'pdflatex'\n\
                 This is pdfTeX, Version 3.14159265\n\
                 LaTeX Warning: Label `eq:1' multiply defined on input line 2.\n\
                 Transcript written on paper.log.\n\
                 Latexmk: Log file says output to 'paper.pdf'\n";
    let mut reader = LineReader::from_text(input);
    let mut messages: Vec<Message> = Vec::new();
    let outcome = Parser::new(&mut reader, &mut messages, Latexmk::new("paper.tex")).parse();
    assert_eq!(outcome, Outcome::new(false, 1, 3));
}
