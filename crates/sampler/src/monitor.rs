use crate::sampler::Sampler;
use std::time::Duration;
use tele_core::{DeviceStatus, Frame, Renderer, Sample, SharedHistory};
use tele_device::RemoteReader;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, trace};

/// Drive the sampling loop until `stop` changes or its sender is dropped.
///
/// Each tick captures a sample, appends it to `history` and renders the new
/// snapshot. Stop is honoured while waiting for the next tick and while reads
/// are in flight; an interrupted tick appends nothing.
pub async fn run_monitor<R, Ren>(
    sampler: Sampler<R>,
    history: SharedHistory,
    mut renderer: Ren,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
) where
    R: RemoteReader,
    Ren: Renderer,
{
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!("Monitor started ({interval:?} interval, {} sample window)", history.capacity());

    let mut ticks: u64 = 0;
    loop {
        tokio::select! {
            biased;
            _ = stop.changed() => break,
            _ = ticker.tick() => {}
        }

        let tick = tokio::select! {
            biased;
            _ = stop.changed() => break,
            tick = sampler.tick() => tick,
        };

        history.append(tick.sample);
        renderer.render(&history.snapshot(), &tick.status);
        ticks += 1;
    }

    info!("Monitor stopped after {ticks} ticks");
}

/// Handle to a monitor loop running on the Tokio runtime.
///
/// Dropping the handle signals the loop to stop; [`MonitorHandle::stop`]
/// also waits for it to finish.
pub struct MonitorHandle {
    stop: watch::Sender<bool>,
    join: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Signal stop and wait for the loop to exit.
    pub async fn stop(mut self) {
        let _ = self.stop.send(true);
        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                tracing::error!("monitor task ended abnormally: {e}");
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        let _ = self.stop.send(true);
    }
}

/// Spawn [`run_monitor`] as a background Tokio task.
pub fn spawn_monitor<R, Ren>(
    sampler: Sampler<R>,
    history: SharedHistory,
    renderer: Ren,
    interval: Duration,
) -> MonitorHandle
where
    R: RemoteReader + 'static,
    Ren: Renderer + 'static,
{
    let (stop, stop_rx) = watch::channel(false);
    let join = tokio::spawn(run_monitor(sampler, history, renderer, interval, stop_rx));
    MonitorHandle { stop, join: Some(join) }
}

/// [`Renderer`] that forwards each tick's [`Frame`] over a bounded channel.
///
/// A slow consumer loses frames rather than stalling the loop; each frame
/// carries the whole window, so the next one supersedes any it missed.
#[derive(Debug)]
pub struct ChannelRenderer {
    tx: mpsc::Sender<Frame>,
}

impl ChannelRenderer {
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { tx }, rx)
    }
}

impl Renderer for ChannelRenderer {
    fn render(&mut self, snapshot: &[Sample], status: &DeviceStatus) {
        let frame = Frame {
            samples: snapshot.to_vec(),
            status:  status.clone(),
        };
        if let Err(e) = self.tx.try_send(frame) {
            trace!("frame dropped: {e}");
        }
    }
}
