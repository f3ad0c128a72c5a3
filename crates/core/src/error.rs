use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type used across the entire application.
#[derive(Debug, Error)]
pub enum TeleError {
    #[error("config error: {0}")]
    Config(String),

    #[error("cannot export to '{}': {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = TeleError> = std::result::Result<T, E>;
