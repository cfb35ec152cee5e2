use std::path::PathBuf;

use thiserror::Error;

/// Failures of the library's fallible entry points.
///
/// Parsing itself never fails; these cover configuration and persistence.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown tool `{0}`")]
    UnknownTool(String),

    #[error("invalid link scheme `{scheme}`: {source}")]
    LinkScheme {
        scheme: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
