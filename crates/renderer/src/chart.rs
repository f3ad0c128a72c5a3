use chrono::{DateTime, Local};
use tele_config::ChartConfig;
use tele_core::Sample;
use tele_theme::{Color, Theme};

/// Upper bound on x-axis labels so they don't overlap.
const MAX_TIME_LABELS: usize = 6;

/// A closed value window `[min, max]` on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    /// Build a range; a degenerate or inverted pair is widened around `min`.
    pub fn new(min: f64, max: f64) -> Self {
        if max > min {
            Self { min, max }
        } else {
            Self { min: min - 1.0, max: min + 1.0 }
        }
    }

    pub fn from_pair([min, max]: [f64; 2]) -> Self {
        Self::new(min, max)
    }

    /// Smallest range covering `values`, padded by `pad` of its span on each
    /// side. No values gives `[0, 1]`.
    pub fn fit(values: impl IntoIterator<Item = f64>, pad: f64) -> Self {
        let (lo, hi) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if lo > hi {
            return Self { min: 0.0, max: 1.0 };
        }
        let margin = (hi - lo) * pad;
        Self::new(lo - margin, hi + margin)
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Map `value` into `[0, 1]` (0 = `min`), clamping values outside the window.
    pub fn project(&self, value: f64) -> f64 {
        ((value - self.min) / self.span()).clamp(0.0, 1.0)
    }

    /// `divisions + 1` evenly spaced values from `min` to `max`.
    pub fn ticks(&self, divisions: usize) -> Vec<f64> {
        let divisions = divisions.max(1);
        (0..=divisions)
            .map(|i| self.min + self.span() * i as f64 / divisions as f64)
            .collect()
    }
}

/// One trace plotted against its own y axis.
#[derive(Debug, Clone)]
pub struct Series {
    /// Legend / axis title, e.g. `"Temp (°C)"`.
    pub name:   String,
    pub color:  Color,
    /// Line width in logical pixels.
    pub width:  f32,
    pub range:  AxisRange,
    /// `(x seconds, y value)` in draw order.
    pub points: Vec<(f64, f64)>,
}

impl Series {
    pub fn new(name: impl Into<String>, color: Color, width: f32, range: AxisRange) -> Self {
        Self {
            name: name.into(),
            color,
            width,
            range,
            points: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_points(mut self, points: Vec<(f64, f64)>) -> Self {
        self.points = points;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeLabel {
    pub x:    f64,
    pub text: String,
}

/// Two series sharing a time axis: `primary` on the left, `secondary` on the
/// right.
#[derive(Debug, Clone)]
pub struct DualAxisChart {
    pub title:     Option<String>,
    /// Caption under the time axis.
    pub x_label:   Option<String>,
    pub primary:   Series,
    pub secondary: Series,
    pub x_range:   AxisRange,
    pub labels:    Vec<TimeLabel>,
}

impl DualAxisChart {
    /// Assemble a chart; the x window is fitted to both series.
    pub fn new(title: Option<String>, primary: Series, secondary: Series, labels: Vec<TimeLabel>) -> Self {
        let xs = primary.points.iter().chain(&secondary.points).map(|(x, _)| *x);
        Self {
            title,
            x_label: None,
            x_range: AxisRange::fit(xs, 0.0),
            primary,
            secondary,
            labels,
        }
    }

    #[must_use]
    pub fn with_x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = Some(label.into());
        self
    }

    /// Live view: temperature on the left, big-cluster frequency on the right,
    /// both in the fixed display windows from `cfg`.
    pub fn live(samples: &[Sample], cfg: &ChartConfig, theme: &Theme) -> Self {
        let origin = samples.first().map(|s| s.captured_at);
        let xs: Vec<f64> = samples
            .iter()
            .map(|s| origin.map_or(0.0, |o| seconds_between(o, s.captured_at)))
            .collect();

        let temp = Series::new("Temp (°C)", theme.temperature, 3.0, AxisRange::from_pair(cfg.temperature_range))
            .with_points(xs.iter().zip(samples).map(|(x, s)| (*x, s.temperature_c)).collect());
        let big = Series::new(
            "Big Core (MHz)",
            theme.frequency,
            2.0,
            AxisRange::from_pair(cfg.frequency_range),
        )
        .with_points(xs.iter().zip(samples).map(|(x, s)| (*x, s.freq_big_mhz)).collect());

        let labels = time_labels(&xs, |i| samples[i].captured_at.format("%H:%M:%S").to_string());
        Self::new(None, temp, big, labels)
    }

    /// Position of `point` inside the plot area as `(0..=1, 0..=1)`, origin
    /// bottom-left.
    pub fn unit_position(&self, series: &Series, (x, y): (f64, f64)) -> (f64, f64) {
        (self.x_range.project(x), series.range.project(y))
    }
}

/// Pick at most [`MAX_TIME_LABELS`] evenly spread labels over `xs`, always
/// including the first and last point.
pub fn time_labels(xs: &[f64], text: impl Fn(usize) -> String) -> Vec<TimeLabel> {
    let n = xs.len();
    if n == 0 {
        return Vec::new();
    }
    let count = n.min(MAX_TIME_LABELS);
    let mut indices: Vec<usize> = if count == 1 {
        vec![0]
    } else {
        (0..count).map(|k| k * (n - 1) / (count - 1)).collect()
    };
    indices.dedup();
    indices
        .into_iter()
        .map(|i| TimeLabel { x: xs[i], text: text(i) })
        .collect()
}

fn seconds_between(from: DateTime<Local>, to: DateTime<Local>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1_000.0
}
