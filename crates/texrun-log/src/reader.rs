use std::io::BufRead;

/// Width at which TeX hard-wraps its terminal output.
pub const WRAP_WIDTH: usize = 79;

/// A line of exactly [`WRAP_WIDTH`] bytes ending in one of these is complete.
const SENTENCE_END: [u8; 2] = [b'!', b'.'];

/// Line-oriented reader shared by every parser reading one stream.
///
/// Produces two granularities:
///
/// - [`next_logical`](Self::next_logical) merges lines that TeX broke at
///   [`WRAP_WIDTH`] into a single statement.
/// - [`next_physical`](Self::next_physical) returns exactly one raw line, for
///   handlers that look ahead at what follows a match.
///
/// Read failures are logged and treated as end of stream; invalid UTF-8 is
/// decoded lossily.
pub struct LineReader<'r> {
    inner: Box<dyn BufRead + 'r>,
    buf: Vec<u8>,
    exhausted: bool,
}

impl<'r> LineReader<'r> {
    pub fn new(inner: impl BufRead + 'r) -> Self {
        Self {
            inner: Box::new(inner),
            buf: Vec::new(),
            exhausted: false,
        }
    }

    /// Reader over an in-memory transcript.
    pub fn from_text(text: &'r str) -> Self {
        Self::new(text.as_bytes())
    }

    /// Returns the next raw line without its terminator, or `None` at end of stream.
    pub fn next_physical(&mut self) -> Option<String> {
        self.read_line()?;
        Some(String::from_utf8_lossy(&self.buf).into_owned())
    }

    /// Returns the next statement, joining hard-wrapped continuation lines.
    ///
    /// A line is continued when it is exactly [`WRAP_WIDTH`] bytes long and
    /// does not end in `.` or `!`. The width is measured on the raw bytes, and
    /// the statement is decoded only after joining, so a character TeX split
    /// across the break survives. End of stream in the middle of a
    /// continuation yields what was accumulated.
    pub fn next_logical(&mut self) -> Option<String> {
        let mut terminated = self.read_line()?;
        let mut wrapped = is_wrapped(&self.buf);
        let mut statement = std::mem::take(&mut self.buf);

        while terminated && wrapped {
            match self.read_line() {
                Some(next_terminated) => {
                    wrapped = is_wrapped(&self.buf);
                    terminated = next_terminated;
                    statement.extend_from_slice(&self.buf);
                }
                None => break,
            }
        }
        let text = String::from_utf8_lossy(&statement).into_owned();
        self.buf = statement;
        Some(text)
    }

    /// Reads one line into `buf` without its terminator, reporting whether
    /// it ended with a newline.
    fn read_line(&mut self) -> Option<bool> {
        if self.exhausted {
            return None;
        }
        self.buf.clear();
        match self.inner.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.exhausted = true;
                None
            }
            Ok(_) => {
                let terminated = self.buf.last() == Some(&b'\n');
                if terminated {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Some(terminated)
            }
            Err(e) => {
                log::warn!("read failed, treating as end of stream: {e}");
                self.exhausted = true;
                None
            }
        }
    }
}

fn is_wrapped(line: &[u8]) -> bool {
    line.len() == WRAP_WIDTH && line.last().is_some_and(|last| !SENTENCE_END.contains(last))
}
