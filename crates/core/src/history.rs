use crate::sample::{format_value, Sample};
use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::{Arc, PoisonError, RwLock};

/// Number of samples retained when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 60;

/// Header row of the live export format.
pub const EXPORT_HEADER: &str = "timestamp,temperature,freq_little,freq_big,voltage";

const EXPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Rolling window of telemetry samples, oldest first.
///
/// Holds at most `capacity` samples; appending to a full window evicts from
/// the front.
#[derive(Debug, Clone)]
pub struct RollingHistory {
    samples:  VecDeque<Sample>,
    capacity: usize,
}

impl Default for RollingHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl RollingHistory {
    /// Create an empty history. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new sample, evicting the oldest ones beyond capacity.
    ///
    /// A sample stamped earlier than the newest retained one (wall clock
    /// stepped back) is re-stamped to that time so the window stays ordered.
    pub fn append(&mut self, mut sample: Sample) {
        if let Some(last) = self.samples.back() {
            if sample.captured_at < last.captured_at {
                tracing::debug!(
                    "sample at {} precedes newest {}; clamping",
                    sample.captured_at,
                    last.captured_at
                );
                sample.captured_at = last.captured_at;
            }
        }

        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
        debug_assert!(self.samples.len() <= self.capacity);
    }

    /// Point-in-time copy of the window in capture order.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }

    /// Serialize the current window as CSV with [`EXPORT_HEADER`].
    pub fn export(&self) -> Vec<u8> {
        export_csv(self.samples.iter())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

fn export_csv<'a>(samples: impl Iterator<Item = &'a Sample>) -> Vec<u8> {
    let mut out = String::from(EXPORT_HEADER);
    out.push('\n');
    for s in samples {
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "{},{},{},{},{}",
            s.captured_at.format(EXPORT_TIME_FORMAT),
            format_value(s.temperature_c),
            format_value(s.freq_little_mhz),
            format_value(s.freq_big_mhz),
            format_value(s.voltage_v),
        );
    }
    out.into_bytes()
}

/// File name for an export taken at `at`: `<prefix><HHMMSS>.csv`.
pub fn export_file_name(at: DateTime<Local>, prefix: &str) -> String {
    format!("{prefix}{}.csv", at.format("%H%M%S"))
}

/// A [`RollingHistory`] shared between the tick loop (sole writer) and any
/// number of readers.
///
/// Every read hands out a copy taken under the lock, so a reader never sees
/// a window mid-eviction.
#[derive(Debug, Clone, Default)]
pub struct SharedHistory {
    inner: Arc<RwLock<RollingHistory>>,
}

impl SharedHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RollingHistory::new(capacity))),
        }
    }

    pub fn append(&self, sample: Sample) {
        // Append-and-trim runs entirely under one guard, so a poisoned lock
        // still holds a consistent window.
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .append(sample);
    }

    pub fn snapshot(&self) -> Vec<Sample> {
        self.read(RollingHistory::snapshot)
    }

    pub fn export(&self) -> Vec<u8> {
        self.read(RollingHistory::export)
    }

    pub fn len(&self) -> usize {
        self.read(RollingHistory::len)
    }

    pub fn is_empty(&self) -> bool {
        self.read(RollingHistory::is_empty)
    }

    pub fn capacity(&self) -> usize {
        self.read(RollingHistory::capacity)
    }

    fn read<T>(&self, f: impl FnOnce(&RollingHistory) -> T) -> T {
        f(&self.inner.read().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    /// Sample `i` seconds after `base()` whose temperature encodes `i`.
    fn sample(i: i64) -> Sample {
        Sample {
            captured_at:     base() + Duration::seconds(i),
            temperature_c:   i as f64,
            freq_little_mhz: 1000.0,
            freq_big_mhz:    2000.0,
            voltage_v:       3.9,
        }
    }

    fn temps(samples: &[Sample]) -> Vec<i64> {
        samples.iter().map(|s| s.temperature_c as i64).collect()
    }

    #[test]
    fn retains_min_of_appends_and_capacity() {
        for n in [0usize, 1, 5, 10, 11, 25] {
            let mut h = RollingHistory::new(10);
            for i in 0..n as i64 {
                h.append(sample(i));
            }
            assert_eq!(h.len(), n.min(10), "n = {n}");
            let expected: Vec<i64> = (n.saturating_sub(10) as i64..n as i64).collect();
            assert_eq!(temps(&h.snapshot()), expected, "n = {n}");
        }
    }

    #[test]
    fn sixty_five_into_sixty_keeps_last_sixty_oldest_first() {
        let mut h = RollingHistory::default();
        for i in 0..65 {
            h.append(sample(i));
        }
        let snap = h.snapshot();
        assert_eq!(snap.len(), 60);
        assert_eq!(temps(&snap), (5..65).collect::<Vec<_>>());
        assert_eq!(h.len(), h.capacity());
    }

    #[test]
    fn snapshot_is_idempotent() {
        let mut h = RollingHistory::new(4);
        for i in 0..6 {
            h.append(sample(i));
        }
        assert_eq!(h.snapshot(), h.snapshot());
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut h = RollingHistory::new(0);
        h.append(sample(1));
        h.append(sample(2));
        assert_eq!(h.capacity(), 1);
        assert_eq!(temps(&h.snapshot()), vec![2]);
    }

    #[test]
    fn backwards_timestamp_is_clamped() {
        let mut h = RollingHistory::new(4);
        h.append(sample(10));
        h.append(sample(3));
        let snap = h.snapshot();
        assert_eq!(snap[1].captured_at, snap[0].captured_at);
        assert_eq!(snap[1].temperature_c, 3.0);
    }

    #[test]
    fn export_writes_header_and_canonical_rows() {
        let mut h = RollingHistory::new(4);
        h.append(Sample {
            captured_at:     base(),
            temperature_c:   45.23,
            freq_little_mhz: 1401.6,
            freq_big_mhz:    1900.8,
            voltage_v:       3.95,
        });
        h.append(Sample::fallback(base() + Duration::seconds(1)));

        let csv = String::from_utf8(h.export()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], EXPORT_HEADER);
        assert_eq!(lines[1], "2024-05-01 12:00:00.000000,45.23,1401.6,1900.8,3.95");
        assert_eq!(lines[2], "2024-05-01 12:00:01.000000,0.0,0.0,0.0,0.0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn export_of_empty_history_is_header_only() {
        let csv = String::from_utf8(RollingHistory::default().export()).unwrap();
        assert_eq!(csv, format!("{EXPORT_HEADER}\n"));
    }

    #[test]
    fn export_file_name_embeds_capture_time() {
        let at = Local.with_ymd_and_hms(2024, 5, 1, 9, 7, 3).unwrap();
        assert_eq!(export_file_name(at, "c7_telemetry_"), "c7_telemetry_090703.csv");
    }

    #[test]
    fn shared_history_snapshots_are_copies() {
        let shared = SharedHistory::new(3);
        shared.append(sample(1));
        let before = shared.snapshot();
        shared.append(sample(2));
        assert_eq!(before.len(), 1);
        assert_eq!(shared.len(), 2);

        let other = shared.clone();
        other.append(sample(3));
        other.append(sample(4));
        assert_eq!(temps(&shared.snapshot()), vec![2, 3, 4]);
    }
}
