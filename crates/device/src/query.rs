use std::fmt;
use tele_config::QueryConfig;

/// Telemetry queries the sampler issues each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    /// Device product model (connection status only).
    Model,
    /// Thermal zone 1 temperature.
    Temperature,
    /// CPU core 0 scaling frequency (little cluster).
    FreqLittle,
    /// CPU core 7 scaling frequency (big cluster).
    FreqBig,
    /// Battery voltage.
    Voltage,
}

impl Query {
    pub const ALL: [Query; 5] = [
        Query::Model,
        Query::Temperature,
        Query::FreqLittle,
        Query::FreqBig,
        Query::Voltage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Query::Model       => "model",
            Query::Temperature => "temperature",
            Query::FreqLittle  => "freq_little",
            Query::FreqBig     => "freq_big",
            Query::Voltage     => "voltage",
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps each [`Query`] to the shell command that answers it on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMap {
    model:       String,
    temperature: String,
    freq_little: String,
    freq_big:    String,
    voltage:     String,
}

impl QueryMap {
    pub fn from_config(cfg: &QueryConfig) -> Self {
        Self {
            model:       cfg.model.clone(),
            temperature: cfg.temperature.clone(),
            freq_little: cfg.freq_little.clone(),
            freq_big:    cfg.freq_big.clone(),
            voltage:     cfg.voltage.clone(),
        }
    }

    pub fn command(&self, query: Query) -> &str {
        match query {
            Query::Model       => &self.model,
            Query::Temperature => &self.temperature,
            Query::FreqLittle  => &self.freq_little,
            Query::FreqBig     => &self.freq_big,
            Query::Voltage     => &self.voltage,
        }
    }
}

impl Default for QueryMap {
    fn default() -> Self {
        Self::from_config(&QueryConfig::default())
    }
}
