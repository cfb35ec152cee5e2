//! Output side of the parsers: where [`Message`]s go and how they are rendered.

use std::io::Write;
use std::path::{Path, PathBuf};

use url::{Url, form_urlencoded};

use crate::error::{Error, Result};
use crate::ir::{Location, Message, Tool};

/// Receives every message a parser produces, in order.
pub trait Sink {
    fn emit(&mut self, message: Message);
}

impl Sink for Vec<Message> {
    fn emit(&mut self, message: Message) {
        self.push(message);
    }
}

/// Builds editor links of the form `<scheme>://open/?url=file://<path>&line=<n>`,
/// with `<path>` percent-encoded.
#[derive(Debug, Clone)]
pub struct Linker {
    base: Url,
    root: Option<PathBuf>,
}

impl Linker {
    pub fn new(scheme: &str) -> Result<Self> {
        let base = Url::parse(&format!("{scheme}://open/")).map_err(|source| Error::LinkScheme {
            scheme: scheme.to_string(),
            source,
        })?;
        Ok(Self { base, root: None })
    }

    /// Resolve relative paths against `root`.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn link(&self, file: &str, line: u32) -> String {
        let path = match &self.root {
            Some(root) if Path::new(file).is_relative() => root.join(file),
            _ => PathBuf::from(file),
        };
        let mut url = self.base.clone();
        url.set_query(Some(&format!("url=file://{}&line={line}", encode_path(&path))));
        url.into()
    }
}

/// Percent-encodes each segment of `path`, keeping the `/` separators.
/// Spaces become `%20`; editors do not form-decode the `url` parameter.
fn encode_path(path: &Path) -> String {
    path.to_string_lossy()
        .split('/')
        .map(|segment| {
            form_urlencoded::byte_serialize(segment.as_bytes())
                .collect::<String>()
                .replace('+', "%20")
        })
        .collect::<Vec<_>>()
        .join("/")
}

impl Default for Linker {
    fn default() -> Self {
        Self {
            base: Url::parse("txmt://open/").expect("static URL is valid"),
            root: None,
        }
    }
}

/// Renders messages as HTML fragments, one per line, flushing after each.
///
/// Write failures are logged and otherwise ignored.
pub struct HtmlWriter<W: Write> {
    out: W,
    linker: Linker,
}

impl<W: Write> HtmlWriter<W> {
    pub fn new(out: W, linker: Linker) -> Self {
        Self { out, linker }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn anchor(&self, file: &str, line: u32, label: &str) -> String {
        format!(
            r#"<a href="{}">{}</a>"#,
            escape(&self.linker.link(file, line)),
            escape(label)
        )
    }

    fn located(&self, class: &str, text: &str, location: &Option<Location>) -> String {
        match location {
            Some(loc) => format!(
                r#"<p class="{class}">{} {}</p>"#,
                self.anchor(&loc.file, loc.line, &format!("{}:{}", loc.file, loc.line)),
                escape(text)
            ),
            None => format!(r#"<p class="{class}">{}</p>"#, escape(text)),
        }
    }

    /// The HTML fragment for one message.
    pub fn render(&self, message: &Message) -> String {
        match message {
            Message::Info { text } => format!(r#"<p class="info">{}</p>"#, escape(text)),
            Message::Warning { text, location } => self.located("warning", text, location),
            Message::Error { text, location } => self.located("error", text, location),
            Message::Fatal { text } => format!(r#"<p class="error">{}</p>"#, escape(text)),
            Message::FormatWarning { text } => {
                format!(r#"<p class="fmtWarning">{}</p>"#, escape(text))
            }
            Message::Verbatim { text } => escape(text),
            Message::Excerpt { lines } => format!("<pre>{}</pre>", escape(&lines.join("\n"))),
            Message::Latexmk { text } => format!(r#"<p class="ltxmk">{}</p>"#, escape(text)),
            Message::ToolStarted { tool, banner } => {
                let rule = if *tool == Tool::Latex { "<hr>" } else { "" };
                format!(r#"<div class="{tool}">{rule}<h3>{}</h3>"#, escape(banner))
            }
            Message::ToolFinished { .. } => "</div>".to_string(),
            Message::ToolVersion { tool, version } => format!(
                r#"<p class="info">Run <strong>{}</strong>, version {}</p>"#,
                tool.display_name(),
                escape(version)
            ),
            Message::FileEntered { path } => format!("<h4>Processing: {}</h4>", escape(path)),
            Message::Include { path } => {
                format!("<ul><li>Including: {}</li></ul>", escape(path))
            }
            Message::Progress {
                description,
                file,
                status,
            } => format!(
                r#"<p class="info">{} {}: <strong>{}</strong></p>"#,
                escape(description),
                escape(file),
                escape(status)
            ),
            Message::Sorting { status } => format!(
                r#"<p class="info">Sorting entries: <strong>{}</strong></p>"#,
                escape(status)
            ),
            Message::Artifact { description, path } => format!(
                r#"<p class="info">{} {}</p>"#,
                escape(description),
                self.anchor(path, 1, path)
            ),
            Message::Transcript { path } => format!(
                "<p>Complete transcript is in {}</p>",
                self.anchor(path, 1, path)
            ),
            Message::GlossaryType { name, files } => format!(
                r#"<p class="info">Add Glossary Type <strong>{}</strong><i> (Files: {})</i></p>"#,
                escape(name),
                escape(files)
            ),
            Message::XindyRun { glossary, language } => format!(
                r#"<h3>Run xindy for glossary type {}</h3><p class="info">Language: {}</p>"#,
                escape(glossary),
                escape(language)
            ),
            Message::GlossaryFinished { name, path } => format!(
                r#"<p class="info">Finished glossary for type <strong>{}</strong>. Output is in {}</p>"#,
                escape(name),
                self.anchor(path, 1, path)
            ),
            Message::AbnormalTermination { log } => format!(
                r#"<p class="error">A fatal error occurred, log file is in {}</p>"#,
                self.anchor(log, 1, log)
            ),
            Message::RunSummary {
                errors, warnings, ..
            } => format!("<hr><p> {errors} Errors {warnings} Warnings in this run.</p>"),
            Message::Summary { outcome, runs } => {
                let fatal = if outcome.fatal { "Fatal error. " } else { "" };
                format!(
                    r#"<p class="info">{fatal}Found {} errors, and {} warnings in {runs} run{}</p>"#,
                    outcome.errors,
                    outcome.warnings,
                    if *runs == 1 { "" } else { "s" }
                )
            }
        }
    }
}

impl<W: Write> Sink for HtmlWriter<W> {
    fn emit(&mut self, message: Message) {
        let html = self.render(&message);
        if let Err(e) = writeln!(self.out, "{html}").and_then(|_| self.out.flush()) {
            log::warn!("failed to write output: {e}");
        }
    }
}

/// Writes each message as one JSON object per line.
pub struct JsonLines<W: Write> {
    out: W,
}

impl<W: Write> JsonLines<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for JsonLines<W> {
    fn emit(&mut self, message: Message) {
        let written = serde_json::to_writer(&mut self.out, &message)
            .map_err(std::io::Error::other)
            .and_then(|_| writeln!(self.out))
            .and_then(|_| self.out.flush());
        if let Err(e) = written {
            log::warn!("failed to write output: {e}");
        }
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Outcome;
    use expect_test::expect;

    #[test]
    fn test_link_encodes_path_and_line() {
        let linker = Linker::default();
        assert_eq!(
            linker.link("/tmp/Wide Open.tex", 20),
            "txmt://open/?url=file:///tmp/Wide%20Open.tex&line=20"
        );
        assert_eq!(
            linker.link("Wide Open Spaces.txt", 20),
            "txmt://open/?url=file://Wide%20Open%20Spaces.txt&line=20"
        );
        assert_eq!(
            linker.link("Tests/TeX/makeindex.tex", 1),
            "txmt://open/?url=file://Tests/TeX/makeindex.tex&line=1"
        );
    }

    #[test]
    fn test_link_resolves_relative_paths() {
        let linker = Linker::new("mvim").unwrap().with_root("/home/ada/thesis");
        assert_eq!(
            linker.link("ch1.tex", 3),
            "mvim://open/?url=file:///home/ada/thesis/ch1.tex&line=3"
        );
        assert_eq!(
            linker.link("/abs/ch2.tex", 4),
            "mvim://open/?url=file:///abs/ch2.tex&line=4"
        );
    }

    #[test]
    fn test_link_escapes_query_delimiters() {
        let linker = Linker::default();
        assert_eq!(
            linker.link("R&D/a+b.tex", 2),
            "txmt://open/?url=file://R%26D/a%2Bb.tex&line=2"
        );
    }

    #[test]
    fn test_bad_scheme_is_rejected() {
        assert!(matches!(
            Linker::new("not a scheme"),
            Err(Error::LinkScheme { .. })
        ));
    }

    #[test]
    fn test_render_located_error() {
        let writer = HtmlWriter::new(Vec::new(), Linker::default());
        let html = writer.render(&Message::Error {
            text: "Undefined control sequence.".into(),
            location: Some(Location::new("/doc/main.tex", 22)),
        });
        expect![[r#"<p class="error"><a href="txmt://open/?url=file:///doc/main.tex&amp;line=22">/doc/main.tex:22</a> Undefined control sequence.</p>"#]]
            .assert_eq(&html);
    }

    #[test]
    fn test_render_escapes_markup() {
        let writer = HtmlWriter::new(Vec::new(), Linker::default());
        let html = writer.render(&Message::Warning {
            text: "Font shape `OT1/cmss/m/n' in size <4> not available".into(),
            location: None,
        });
        expect![[r#"<p class="warning">Font shape `OT1/cmss/m/n' in size &lt;4&gt; not available</p>"#]]
            .assert_eq(&html);
    }

    #[test]
    fn test_render_summary() {
        let writer = HtmlWriter::new(Vec::new(), Linker::default());
        let one = writer.render(&Message::Summary {
            outcome: Outcome::new(false, 2, 1),
            runs: 1,
        });
        let many = writer.render(&Message::Summary {
            outcome: Outcome::new(true, 3, 0),
            runs: 4,
        });
        assert_eq!(
            one,
            r#"<p class="info">Found 2 errors, and 1 warnings in 1 run</p>"#
        );
        assert_eq!(
            many,
            r#"<p class="info">Fatal error. Found 3 errors, and 0 warnings in 4 runs</p>"#
        );
    }

    #[test]
    fn test_html_writer_emits_lines() {
        let mut writer = HtmlWriter::new(Vec::new(), Linker::default());
        writer.emit(Message::Info {
            text: "Document Class: article".into(),
        });
        writer.emit(Message::ToolFinished { tool: Tool::Bibtex });
        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, "<p class=\"info\">Document Class: article</p>\n</div>\n");
    }

    #[test]
    fn test_json_lines() {
        let mut sink = JsonLines::new(Vec::new());
        sink.emit(Message::Include {
            path: "fig.pdf".into(),
        });
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "{\"kind\":\"Include\",\"data\":{\"path\":\"fig.pdf\"}}\n");
    }
}
