//! Sampling, normalization and the driving tick loop.
//!
//! [`Sampler`] turns raw remote reads into canonical [`tele_core::Sample`]s,
//! [`run_monitor`] / [`spawn_monitor`] tick it at a fixed period into a
//! [`tele_core::SharedHistory`] and hand every new snapshot to a
//! [`tele_core::Renderer`].

pub mod monitor;
pub mod normalize;
pub mod sampler;

pub use monitor::{run_monitor, spawn_monitor, ChannelRenderer, MonitorHandle};
pub use sampler::{Sampler, Tick};
