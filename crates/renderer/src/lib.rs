//! Dual-axis time-series chart for telemetry.
//!
//! [`chart`] holds the display-independent model: series, axis windows, time
//! labels and the value → unit-interval projection. [`canvas`] draws that
//! model with an Iced canvas, [`raster`] into a PNG for headless hosts.

pub mod canvas;
pub mod chart;
pub mod raster;

pub use canvas::ChartView;
pub use chart::{time_labels, AxisRange, DualAxisChart, Series, TimeLabel};
pub use raster::{rasterize, save_png};
