//! soc-telemetry: live SoC temperature, CPU frequency and battery telemetry
//! for an Android device reachable over `adb`.
//!
//! Run with:  `RUST_LOG=info soc-telemetry`

use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Structured logging; RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("soc-telemetry v{} starting", env!("CARGO_PKG_VERSION"));

    tele_dashboard::run().map_err(Into::into)
}
