//! Offline session logs.
//!
//! A session log is a CSV file with the header `Timestamp,CPU_Load,Temp_C`
//! and `HH:MM:SS` timestamps, written by an on-device logger. It is a separate
//! schema from the dashboard's live export and is not round-trippable with it.

pub mod discover;
pub mod error;
pub mod log;

pub use discover::{latest_log, resolve};
pub use error::{Result, SessionError};
pub use log::{load_log, parse_log, LogRow, SessionLog, TIME_FORMAT};
