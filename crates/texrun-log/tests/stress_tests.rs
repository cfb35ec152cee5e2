use std::io::BufReader;

use texrun_log::grammars::{Bibtex, Latex, parse_tool};
use texrun_log::ir::{Message, Outcome, Tool};
use texrun_log::{LineReader, Parser};

#[test]
fn test_byte_by_byte_streaming() {
    let input = include_str!("fixtures/latex.log");

    let mut whole = LineReader::from_text(input);
    let mut expected: Vec<Message> = Vec::new();
    let expected_report = parse_tool(Tool::Latex, "report.tex", &mut whole, &mut expected, true);

    // A one-byte buffer makes every line arrive in pieces.
    let mut trickle = LineReader::new(BufReader::with_capacity(1, input.as_bytes()));
    let mut events: Vec<Message> = Vec::new();
    let report = parse_tool(Tool::Latex, "report.tex", &mut trickle, &mut events, true);

    assert_eq!(report, expected_report);
    assert_eq!(events, expected);
}

#[test]
fn test_many_warnings() {
    let mut input = String::from("This is BibTeX, Version 0.99d\n");
    for i in 0..10_000 {
        input.push_str(&format!("Warning--empty year in entry{i}\n"));
    }
    input.push_str("(There were 10000 warnings)\n");

    let mut reader = LineReader::from_text(&input);
    let mut messages: Vec<Message> = Vec::new();
    let outcome = Parser::new(&mut reader, &mut messages, Bibtex).parse();
    assert_eq!(outcome, Outcome::new(false, 0, 10_000));
    assert_eq!(messages.len(), 10_001);
}

#[test]
fn test_invalid_utf8_is_decoded_lossily() {
    let mut input = b"(./main.tex\n./main.tex:3: Undefined control sequence \\caf".to_vec();
    input.extend_from_slice(&[0xe9, 0xff]);
    input.extend_from_slice(b".\nTranscript written on main.log.\n");

    let mut reader = LineReader::new(&input[..]);
    let mut messages: Vec<Message> = Vec::new();
    let mut parser = Parser::new(&mut reader, &mut messages, Latex::new("main.tex"));
    assert_eq!(parser.parse(), Outcome::new(false, 1, 0));
    assert!(parser.marks()[0].message.contains('\u{FFFD}'));
}
