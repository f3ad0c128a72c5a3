pub mod schema;
pub mod watcher;

pub use schema::{
    ChartConfig, DeviceConfig, ExportConfig, QueryConfig, SamplingConfig, SessionConfig,
    TelemetryConfig, ThemeConfig,
};
pub use watcher::ConfigWatcher;

use std::path::{Path, PathBuf};
use tele_core::{Result, TeleError};

/// Load configuration from a TOML file.  Returns `TelemetryConfig::default()`
/// if the file doesn't exist so the tools always have sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<TelemetryConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(TelemetryConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| TeleError::Config(format!("cannot read '{}': {e}", path.display())))?;

    parse(&raw)
}

/// Parse and validate a TOML document.
pub fn parse(raw: &str) -> Result<TelemetryConfig> {
    let config: TelemetryConfig =
        toml::from_str(raw).map_err(|e| TeleError::Config(format!("TOML parse error: {e}")))?;
    config.validate()?;
    Ok(config)
}

impl TelemetryConfig {
    /// Reject values the sampler and chart cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.sampling.interval_ms == 0 {
            return Err(TeleError::Config("sampling.interval_ms must be > 0".into()));
        }
        if self.sampling.history_len == 0 {
            return Err(TeleError::Config("sampling.history_len must be > 0".into()));
        }
        if self.device.timeout_ms == 0 {
            return Err(TeleError::Config("device.timeout_ms must be > 0".into()));
        }
        check_range("chart.temperature_range", self.chart.temperature_range)?;
        check_range("chart.frequency_range", self.chart.frequency_range)?;
        Ok(())
    }
}

fn check_range(name: &str, [min, max]: [f64; 2]) -> Result<()> {
    if min.is_finite() && max.is_finite() && min < max {
        Ok(())
    } else {
        Err(TeleError::Config(format!("{name} must satisfy min < max, got [{min}, {max}]")))
    }
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("soc-telemetry").join("telemetry.toml")
}
