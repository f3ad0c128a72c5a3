//! Raw reading → canonical unit conversion.
//!
//! The device reports each signal in whatever scale its driver chose, with no
//! unit metadata. The scale is sniffed from the magnitude using fixed
//! thresholds calibrated for the target device's sensors:
//!
//! | signal      | raw                          | canonical          |
//! |-------------|------------------------------|--------------------|
//! | temperature | `> 1000` → millidegrees      | °C                 |
//! | voltage     | `> 1e6` → µV, `> 1000` → mV  | V, 3 decimals      |
//! | frequency   | digits only, kHz             | MHz                |
//!
//! Changing a threshold changes recorded values; treat it as a behavior change.
//!
//! Every `*_or_fallback` function is total: `None` (the read failed) or an
//! unparseable reading yields [`FALLBACK`].

use tele_core::FALLBACK;

const MILLI_THRESHOLD: f64 = 1_000.0;
const MICRO_THRESHOLD: f64 = 1_000_000.0;

/// Parse a finite float, as written by sysfs (surrounding whitespace allowed).
fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Degrees Celsius from a thermal-zone reading.
pub fn parse_temperature(raw: &str) -> Option<f64> {
    let t = parse_float(raw)?;
    Some(if t > MILLI_THRESHOLD { t / 1_000.0 } else { t })
}

/// Volts from a power-supply reading, rounded to 3 decimal places.
pub fn parse_voltage(raw: &str) -> Option<f64> {
    let v = parse_float(raw)?;
    let volts = if v > MICRO_THRESHOLD {
        v / 1_000_000.0
    } else if v > MILLI_THRESHOLD {
        v / 1_000.0
    } else {
        v
    };
    Some(round3(volts))
}

/// MHz from a `scaling_cur_freq` reading in kHz.
///
/// Only plain ASCII digit strings qualify: no sign, no decimal point, no
/// whitespace.
pub fn parse_frequency(raw: &str) -> Option<f64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<f64>().ok().map(|khz| khz / 1_000.0)
}

pub fn temperature_or_fallback(raw: Option<&str>) -> f64 {
    raw.and_then(parse_temperature).unwrap_or(FALLBACK)
}

pub fn voltage_or_fallback(raw: Option<&str>) -> f64 {
    raw.and_then(parse_voltage).unwrap_or(FALLBACK)
}

pub fn frequency_or_fallback(raw: Option<&str>) -> f64 {
    raw.and_then(parse_frequency).unwrap_or(FALLBACK)
}

/// Round to 3 decimals on the exact binary value, ties to even, so
/// `3.0025` (stored just below) gives `3.002`.
fn round3(v: f64) -> f64 {
    format!("{v:.3}").parse().unwrap_or(FALLBACK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millidegrees_are_scaled() {
        assert_eq!(temperature_or_fallback(Some("45230")), 45.23);
        assert_eq!(temperature_or_fallback(Some("1001")), 1.001);
    }

    #[test]
    fn degrees_pass_through() {
        assert_eq!(temperature_or_fallback(Some("45")), 45.0);
        assert_eq!(temperature_or_fallback(Some("1000")), 1000.0);
        assert_eq!(temperature_or_fallback(Some("38.5")), 38.5);
        assert_eq!(temperature_or_fallback(Some("-5")), -5.0);
    }

    #[test]
    fn temperature_matches_threshold_rule_across_inputs() {
        for t in [0.0, 12.5, 999.0, 1000.0, 1000.5, 30_000.0, 87_654.0] {
            let expected = if t > 1000.0 { t / 1000.0 } else { t };
            assert_eq!(temperature_or_fallback(Some(&t.to_string())), expected, "t = {t}");
        }
    }

    #[test]
    fn bad_temperature_falls_back() {
        assert_eq!(temperature_or_fallback(None), 0.0);
        assert_eq!(temperature_or_fallback(Some("")), 0.0);
        assert_eq!(temperature_or_fallback(Some("cat: No such file")), 0.0);
        assert_eq!(temperature_or_fallback(Some("NaN")), 0.0);
        assert_eq!(temperature_or_fallback(Some("inf")), 0.0);
    }

    #[test]
    fn voltage_scales_in_priority_order() {
        assert_eq!(voltage_or_fallback(Some("3950000")), 3.95);
        assert_eq!(voltage_or_fallback(Some("3950")), 3.95);
        assert_eq!(voltage_or_fallback(Some("3.95")), 3.95);
        // Exactly on a threshold stays in the lower scale.
        assert_eq!(voltage_or_fallback(Some("1000000")), 1000.0);
        assert_eq!(voltage_or_fallback(Some("1000")), 1000.0);
    }

    #[test]
    fn voltage_is_rounded_to_millivolts() {
        assert_eq!(voltage_or_fallback(Some("4123456")), 4.123);
        assert_eq!(voltage_or_fallback(Some("4123.6")), 4.124);
        assert_eq!(voltage_or_fallback(Some("3.14159")), 3.142);
    }

    #[test]
    fn half_millivolt_readings_round_on_the_stored_value() {
        assert_eq!(voltage_or_fallback(Some("3002500")), 3.002);
        assert_eq!(voltage_or_fallback(Some("3006500")), 3.006);
        assert_eq!(voltage_or_fallback(Some("4123500")), 4.123);
    }

    #[test]
    fn bad_voltage_falls_back() {
        assert_eq!(voltage_or_fallback(None), 0.0);
        assert_eq!(voltage_or_fallback(Some("n/a")), 0.0);
    }

    #[test]
    fn frequency_khz_to_mhz() {
        assert_eq!(frequency_or_fallback(Some("1900800")), 1900.8);
        assert_eq!(frequency_or_fallback(Some("652800")), 652.8);
        assert_eq!(frequency_or_fallback(Some("0")), 0.0);
    }

    #[test]
    fn frequency_requires_plain_digits() {
        for raw in ["unplugged", "", "-1900800", "+1900800", "1900.8", " 1900800", "1900800\n", "1e6", "١٢٣"] {
            assert_eq!(frequency_or_fallback(Some(raw)), 0.0, "raw = {raw:?}");
        }
        assert_eq!(frequency_or_fallback(None), 0.0);
    }

    #[test]
    fn long_digit_strings_still_scale() {
        // 2^64 MHz, past u64::MAX kHz.
        assert_eq!(frequency_or_fallback(Some("18446744073709551616000")), 18446744073709551616.0);
    }
}
