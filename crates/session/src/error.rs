use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating or parsing a captured session log.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no log files matching '{prefix}*.csv' in '{}'", dir.display())]
    NoLogFiles { dir: PathBuf, prefix: String },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("log has no '{0}' column")]
    MissingColumn(&'static str),

    #[error("line {line}: {reason}")]
    BadRow { line: usize, reason: String },

    #[error("log is empty")]
    Empty,
}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;
