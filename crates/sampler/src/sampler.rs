use crate::normalize;
use chrono::Local;
use tele_core::{DeviceStatus, Sample};
use tele_device::{Query, ReadError, RemoteReader};
use tracing::debug;

/// Result of one sampling tick.
#[derive(Debug, Clone)]
pub struct Tick {
    pub sample: Sample,
    pub status: DeviceStatus,
}

/// Turns remote reads into canonical [`Sample`]s.
///
/// Every signal is read and normalized independently: a failed read only
/// zeroes its own field.
#[derive(Debug, Clone)]
pub struct Sampler<R> {
    reader: R,
}

impl<R: RemoteReader> Sampler<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read the four telemetry signals and stamp them with the current time.
    pub async fn capture_sample(&self) -> Sample {
        let (temp, little, big, volt) = tokio::join!(
            self.read(Query::Temperature),
            self.read(Query::FreqLittle),
            self.read(Query::FreqBig),
            self.read(Query::Voltage),
        );

        Sample {
            captured_at:     Local::now(),
            temperature_c:   normalize::temperature_or_fallback(temp.as_deref()),
            freq_little_mhz: normalize::frequency_or_fallback(little.as_deref()),
            freq_big_mhz:    normalize::frequency_or_fallback(big.as_deref()),
            voltage_v:       normalize::voltage_or_fallback(volt.as_deref()),
        }
    }

    /// Ask the device for its model to decide the connection status.
    pub async fn probe_status(&self) -> DeviceStatus {
        match self.read(Query::Model).await {
            Some(model) => DeviceStatus::Connected { model },
            None        => DeviceStatus::Disconnected,
        }
    }

    /// One full tick: identity query and telemetry capture, joined.
    pub async fn tick(&self) -> Tick {
        let (status, sample) = tokio::join!(self.probe_status(), self.capture_sample());
        Tick { sample, status }
    }

    async fn read(&self, query: Query) -> Option<String> {
        self.reader
            .read(query)
            .await
            .map_err(|e: ReadError| debug!("read '{query}' failed: {e}"))
            .ok()
    }
}
