use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure parsed from `telemetry.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// How to reach the device.
    pub device: DeviceConfig,
    /// Tick cadence and history size.
    pub sampling: SamplingConfig,
    /// Remote command behind each telemetry query.
    pub queries: QueryConfig,
    /// Live chart display windows.
    pub chart: ChartConfig,
    /// Where "Export" writes CSV snapshots.
    pub export: ExportConfig,
    /// Where the offline viewer looks for captured logs.
    pub session: SessionConfig,
    /// Theme / visual settings.
    pub theme: ThemeConfig,
}

/// Command channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// `adb` executable (name on `$PATH` or absolute path).
    pub adb_path: String,
    /// Device serial passed as `adb -s`; `None` = the only attached device.
    pub serial: Option<String>,
    /// Per-query time budget in milliseconds.
    pub timeout_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            adb_path:   "adb".to_string(),
            serial:     None,
            timeout_ms: 2_000,
        }
    }
}

impl DeviceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Tick period in milliseconds.
    pub interval_ms: u64,
    /// Rolling window capacity (samples).
    pub history_len: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1_000,
            history_len: 60,
        }
    }
}

impl SamplingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Shell commands run on the device for each query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub model:       String,
    pub temperature: String,
    pub freq_little: String,
    pub freq_big:    String,
    pub voltage:     String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            model:       "getprop ro.product.model".to_string(),
            temperature: "cat /sys/class/thermal/thermal_zone1/temp".to_string(),
            freq_little: "cat /sys/devices/system/cpu/cpu0/cpufreq/scaling_cur_freq".to_string(),
            freq_big:    "cat /sys/devices/system/cpu/cpu7/cpufreq/scaling_cur_freq".to_string(),
            voltage:     "cat /sys/class/power_supply/battery/voltage_now".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Left axis window in °C, `[min, max]`.
    pub temperature_range: [f64; 2],
    /// Right axis window in MHz, `[min, max]`.
    pub frequency_range: [f64; 2],
    /// Chart height in logical pixels.
    pub height: f32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            temperature_range: [20.0, 60.0],
            frequency_range:   [0.0, 2500.0],
            height:            500.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub directory: PathBuf,
    /// File name prefix; the capture time (`HHMMSS`) and `.csv` follow.
    pub prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            prefix:    "c7_telemetry_".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub directory: PathBuf,
    /// Candidate logs are `<prefix>*.csv`.
    pub prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            prefix:    "kernel_log_".to_string(),
        }
    }
}

/// Theme / styling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Window background color (hex, e.g. `"#1e1e2e"`).
    pub background: String,
    /// Primary text/foreground color.
    pub foreground: String,
    /// Accent / highlight color.
    pub accent: String,
    /// Temperature trace color.
    pub temperature: String,
    /// Frequency trace color.
    pub frequency: String,
    /// Chart grid and axis color.
    pub grid: String,
    /// Base font size in points.
    pub font_size: f32,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background:  "#1e1e2e".to_string(), // Catppuccin Mocha: base
            foreground:  "#cdd6f4".to_string(), // Catppuccin Mocha: text
            accent:      "#cba6f7".to_string(), // Catppuccin Mocha: mauve
            temperature: "#b22222".to_string(), // firebrick
            frequency:   "#4169e1".to_string(), // royalblue
            grid:        "#45475a".to_string(), // Catppuccin Mocha: surface1
            font_size:   14.0,
        }
    }
}
