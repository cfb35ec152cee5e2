//! Bookkeeping for editor gutter marks across runs.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ir::Mark;

/// Which files were given marks by the previous run.
///
/// Stored as JSON next to the project so that marks can be cleared even when
/// the next run produces none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkLedger {
    pub files_with_marks: BTreeSet<String>,
}

/// What the editor has to do to bring its gutter in line with a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkUpdate {
    /// Files whose existing error and warning marks must be removed first.
    pub clear: Vec<String>,
    pub set: Vec<Mark>,
}

impl MarkLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the ledger, falling back to an empty one if it is missing or unreadable.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(ledger) => ledger,
                Err(e) => {
                    log::warn!("Failed to parse mark ledger {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read mark ledger {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replaces the recorded file set with the files in `marks`.
    pub fn update(&mut self, marks: &[Mark]) -> MarkUpdate {
        let marked: BTreeSet<String> = marks.iter().map(|mark| mark.file.clone()).collect();
        let previous = std::mem::replace(&mut self.files_with_marks, marked);
        MarkUpdate {
            clear: previous.into_iter().collect(),
            set: marks.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Severity;

    fn mark(file: &str, line: u32) -> Mark {
        Mark {
            file: file.to_string(),
            line,
            severity: Severity::Error,
            message: "Undefined control sequence.".to_string(),
        }
    }

    #[test]
    fn test_stale_marks_are_cleared_by_an_empty_run() {
        let mut ledger = MarkLedger::new();
        let first = ledger.update(&[mark("main.tex", 4), mark("ch1.tex", 9)]);
        assert!(first.clear.is_empty());
        assert_eq!(first.set.len(), 2);

        let second = ledger.update(&[]);
        assert_eq!(second.clear, vec!["ch1.tex".to_string(), "main.tex".to_string()]);
        assert!(second.set.is_empty());
        assert!(ledger.files_with_marks.is_empty());
    }

    #[test]
    fn test_ledger_persistence() {
        let path = std::env::temp_dir().join(format!("texrun-ledger-{}.json", std::process::id()));
        let mut ledger = MarkLedger::new();
        ledger.update(&[mark("main.tex", 1)]);
        ledger.save_to_path(&path).unwrap();

        let loaded = MarkLedger::load_from_path(&path);
        assert_eq!(loaded, ledger);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_ledger_is_empty() {
        let loaded = MarkLedger::load_from_path(Path::new("/nonexistent/texrun/ledger.json"));
        assert_eq!(loaded, MarkLedger::default());
    }
}
