use chrono::{DateTime, Local};

/// Value stored for a signal whose raw reading was missing or unparseable.
pub const FALLBACK: f64 = 0.0;

/// One telemetry snapshot, always in canonical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Wall-clock capture time.
    pub captured_at:     DateTime<Local>,
    /// SoC temperature in °C.
    pub temperature_c:   f64,
    /// Little-cluster (cpu0) scaling frequency in MHz.
    pub freq_little_mhz: f64,
    /// Big-cluster (cpu7) scaling frequency in MHz.
    pub freq_big_mhz:    f64,
    /// Battery voltage in volts, rounded to millivolts.
    pub voltage_v:       f64,
}

impl Sample {
    /// A sample where every signal carries [`FALLBACK`], what a fully
    /// unreachable device produces.
    #[must_use]
    pub fn fallback(captured_at: DateTime<Local>) -> Self {
        Self {
            captured_at,
            temperature_c:   FALLBACK,
            freq_little_mhz: FALLBACK,
            freq_big_mhz:    FALLBACK,
            voltage_v:       FALLBACK,
        }
    }
}

/// Connection state derived from the device identity query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceStatus {
    /// The identity query answered; carries the product model string.
    Connected { model: String },
    #[default]
    Disconnected,
}

impl DeviceStatus {
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

/// One tick's worth of renderer input: the history snapshot plus device status.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub samples: Vec<Sample>,
    pub status:  DeviceStatus,
}

impl Frame {
    /// Most recent sample in the frame, if any.
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }
}

/// Format a canonical value the way it appears in exports and metric cards:
/// shortest round-trip decimal, with integral values keeping one decimal
/// place (`0.0`, `1804.8`, `3.95`).
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
