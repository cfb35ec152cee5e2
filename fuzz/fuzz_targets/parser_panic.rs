#![no_main]
use libfuzzer_sys::fuzz_target;
use texrun_log::LineReader;
use texrun_log::grammars::parse_tool;
use texrun_log::ir::{Message, Tool};

fuzz_target!(|data: &[u8]| {
    // Every grammar must survive arbitrary bytes, including invalid UTF-8
    // and lines sitting exactly at the wrap width.
    for tool in Tool::ALL {
        let mut reader = LineReader::new(data);
        let mut messages: Vec<Message> = Vec::new();
        let _ = parse_tool(tool, "fuzz.tex", &mut reader, &mut messages, true);
    }
});
