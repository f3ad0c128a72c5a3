//! Command channel to the device under test.
//!
//! A [`RemoteReader`] answers one named [`Query`] with raw text or a
//! [`ReadError`]. Readers hold no state between calls and never retry; the
//! sampling loop simply asks again on the next tick.

pub mod adb;
pub mod error;
pub mod query;

pub use adb::AdbReader;
pub use error::ReadError;
pub use query::{Query, QueryMap};

use std::future::Future;

/// Executes one telemetry query against the device.
pub trait RemoteReader: Send + Sync {
    /// Run `query` and return its trimmed output, or why there is none.
    ///
    /// Must resolve within the reader's time budget; failures are returned,
    /// never panicked.
    fn read(&self, query: Query) -> impl Future<Output = Result<String, ReadError>> + Send;
}
