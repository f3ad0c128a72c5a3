pub mod battery;
pub mod frequency;
pub mod metric;
pub mod status;
pub mod temperature;

pub use battery::BatteryWidget;
pub use frequency::{Cluster, FrequencyWidget};
pub use status::StatusWidget;
pub use temperature::TempWidget;
