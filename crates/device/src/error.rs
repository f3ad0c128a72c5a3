use std::time::Duration;
use thiserror::Error;

/// Why a remote read produced no data.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The command did not finish within its time budget.
    #[error("read timed out after {0:?}")]
    Timeout(Duration),

    /// The command channel could not be started (e.g. `adb` missing).
    #[error("cannot start command channel: {0}")]
    Spawn(#[from] std::io::Error),

    /// The remote command exited unsuccessfully (`None` = killed by signal).
    #[error("remote command failed with exit status {0:?}")]
    ExitStatus(Option<i32>),

    /// Output was not valid UTF-8.
    #[error("output is not valid UTF-8")]
    Utf8,

    /// The command succeeded but printed nothing.
    #[error("empty output")]
    Empty,
}
