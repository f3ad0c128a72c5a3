pub mod error;
pub mod history;
pub mod render;
pub mod sample;

pub use error::{Result, TeleError};
pub use history::{export_file_name, RollingHistory, SharedHistory, DEFAULT_CAPACITY, EXPORT_HEADER};
pub use render::Renderer;
pub use sample::{format_value, DeviceStatus, Frame, Sample, FALLBACK};
