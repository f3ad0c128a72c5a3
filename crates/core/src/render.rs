use crate::sample::{DeviceStatus, Sample};

/// Consumer of the rolling history, invoked once per sampling tick.
///
/// Renderers only ever see a read-only snapshot; they cannot mutate the
/// history. Implementations live in the UI crates (and in tests).
pub trait Renderer: Send {
    fn render(&mut self, snapshot: &[Sample], status: &DeviceStatus);
}
