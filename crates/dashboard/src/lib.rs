//! Live telemetry dashboard.
//!
//! Owns the Iced application loop and wires together the background tasks:
//! - Sampling monitor (only while monitoring is started)
//! - Config file watcher (live reload of theme and chart windows)

use chrono::Local;
use futures::{channel::mpsc::Sender, SinkExt};
use iced::{
    widget::{button, canvas, column, container, row, text},
    Element, Length, Size, Subscription, Task,
};
use std::path::PathBuf;
use std::time::Duration;
use tele_config::{default_path, load as load_config, ConfigWatcher, ExportConfig, TelemetryConfig};
use tele_core::{export_file_name, DeviceStatus, Frame, SharedHistory, TeleError};
use tele_device::AdbReader;
use tele_renderer::{ChartView, DualAxisChart};
use tele_sampler::{spawn_monitor, ChannelRenderer, Sampler};
use tele_theme::Theme;
use tele_widgets::{BatteryWidget, Cluster, FrequencyWidget, StatusWidget, TempWidget};
use tracing::{info, warn};

const HEADING: &str = "Android Kernel Telemetry: Live Command Center";
const SIDEBAR_WIDTH: f32 = 280.0;

// ── Entry point ───────────────────────────────────────────────────────────────

/// Open the dashboard window.  Returns when the window is closed.
pub fn run() -> iced::Result {
    iced::application(Dashboard::new, Dashboard::update, Dashboard::view)
        .title(HEADING)
        .subscription(Dashboard::subscription)
        .style(Dashboard::style)
        .window_size(Size::new(1280.0, 780.0))
        .run()
}

// ── Message ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Message {
    /// User pressed Start: begin a fresh session.
    Start,
    /// User pressed Stop: end the session, keep its history for export.
    Stop,
    /// The monitor created the history for the session that just started.
    SessionStarted(SharedHistory),
    /// One tick's snapshot from the monitor.
    Frame(Frame),
    /// User pressed Export.
    Export,
    /// Export finished: written path or error text.
    Exported(Result<PathBuf, String>),
    /// Config file changed on disk.
    ConfigReloaded,
    /// Device identity queried outside a monitoring session.
    Identified(DeviceStatus),
}

// ── State ─────────────────────────────────────────────────────────────────────

struct Dashboard {
    config:     TelemetryConfig,
    theme:      Theme,
    monitoring: bool,
    /// History of the current (or last) session; `None` before the first Start.
    history:    Option<SharedHistory>,
    frame:      Frame,
    chart:      DualAxisChart,
    export_status: Option<Result<PathBuf, String>>,
    // Widgets
    status:     StatusWidget,
    temp:       TempWidget,
    little:     FrequencyWidget,
    big:        FrequencyWidget,
    battery:    BatteryWidget,
}

impl Dashboard {
    fn new() -> (Self, Task<Message>) {
        let config = load_config(default_path()).unwrap_or_else(|e| {
            warn!("{e}; using defaults");
            TelemetryConfig::default()
        });
        let dashboard = Self::with_config(config);
        let identify = dashboard.identify();
        (dashboard, identify)
    }

    fn with_config(config: TelemetryConfig) -> Self {
        let theme = Theme::from_config(&config.theme);
        let chart = DualAxisChart::live(&[], &config.chart, &theme);
        Self {
            config,
            theme,
            monitoring: false,
            history: None,
            frame: Frame::default(),
            chart,
            export_status: None,
            status:  StatusWidget::new(),
            temp:    TempWidget::new(),
            little:  FrequencyWidget::new(Cluster::Little),
            big:     FrequencyWidget::new(Cluster::Big),
            battery: BatteryWidget::new(),
        }
    }

    fn captured(&self) -> usize {
        self.history.as_ref().map_or(0, SharedHistory::len)
    }

    /// Ask the device who it is once, so the sidebar is truthful before the
    /// first Start.
    fn identify(&self) -> Task<Message> {
        let sampler = Sampler::new(AdbReader::from_config(&self.config.device, &self.config.queries));
        Task::perform(async move { sampler.probe_status().await }, Message::Identified)
    }

    fn rebuild_chart(&mut self) {
        self.chart = DualAxisChart::live(&self.frame.samples, &self.config.chart, &self.theme);
    }

    // ── Update ────────────────────────────────────────────────────────────────

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Start => {
                if !self.monitoring {
                    info!("Monitoring started");
                    self.monitoring = true;
                    self.history = None;
                    // Keep the last known status until the first tick reports.
                    self.frame = Frame {
                        samples: Vec::new(),
                        status:  std::mem::take(&mut self.frame.status),
                    };
                    self.export_status = None;
                    self.rebuild_chart();
                }
            }
            Message::Stop => {
                if self.monitoring {
                    info!("Monitoring stopped ({} samples retained)", self.captured());
                    self.monitoring = false;
                }
            }
            Message::SessionStarted(history) => {
                if self.monitoring {
                    self.history = Some(history);
                }
            }
            Message::Frame(frame) => {
                // Late frames from a stopped session are ignored.
                if self.monitoring {
                    self.frame = frame;
                    self.rebuild_chart();
                }
            }
            Message::Identified(status) => {
                // A running session's ticks are authoritative.
                if !self.monitoring {
                    self.frame.status = status;
                }
            }
            Message::Export => return self.export(),
            Message::Exported(result) => {
                match &result {
                    Ok(path) => info!("Telemetry exported to {}", path.display()),
                    Err(e)   => warn!("Telemetry export failed: {e}"),
                }
                self.export_status = Some(result);
            }
            Message::ConfigReloaded => match load_config(default_path()) {
                Ok(cfg) => {
                    info!("Config reloaded");
                    self.theme  = Theme::from_config(&cfg.theme);
                    self.config = cfg;
                    self.rebuild_chart();
                    if !self.monitoring {
                        return self.identify();
                    }
                }
                Err(e) => warn!("Config reload failed: {e}"),
            },
        }
        Task::none()
    }

    fn export(&self) -> Task<Message> {
        let Some(history) = self.history.as_ref().filter(|h| !h.is_empty()) else {
            return Task::none();
        };
        let bytes = history.export();
        let path = export_path(&self.config.export, Local::now());

        Task::perform(
            async move { write_export(path, bytes).await.map_err(|e| e.to_string()) },
            Message::Exported,
        )
    }

    // ── View ──────────────────────────────────────────────────────────────────

    fn view(&self) -> Element<'_, Message> {
        let fs = self.theme.font_size;
        let latest = self.frame.latest();

        // ── Sidebar: status · start/stop · export ────────────────────────────
        let toggle = if self.monitoring {
            button(text("Stop Monitoring")).on_press(Message::Stop).style(button::danger)
        } else {
            button(text("Start Monitoring")).on_press(Message::Start).style(button::primary)
        };
        let export = button(text("Download Telemetry Log (.csv)"))
            .on_press_maybe((self.captured() > 0).then_some(Message::Export));
        let export_note = match &self.export_status {
            Some(Ok(path)) => text(format!("Saved {}", path.display())).size(fs - 2.0),
            Some(Err(e))   => text(format!("Export failed: {e}"))
                .size(fs - 2.0)
                .color(self.theme.accent.to_iced()),
            None           => text(""),
        };

        let sidebar = column![
            text("Control Panel").size(fs + 4.0),
            self.status.view(&self.frame.status, self.captured(), &self.theme),
            toggle,
            export,
            export_note,
        ]
        .spacing(14)
        .width(Length::Fixed(SIDEBAR_WIDTH));

        // ── Main: metrics row + chart ────────────────────────────────────────
        let metrics = row![
            self.temp.view(latest, &self.theme),
            self.little.view(latest, &self.theme),
            self.big.view(latest, &self.theme),
            self.battery.view(latest, &self.theme),
        ]
        .spacing(12);

        let chart = canvas(ChartView::new(&self.chart, &self.theme))
            .width(Length::Fill)
            .height(Length::Fixed(self.config.chart.height));

        let main = column![
            text(HEADING).size(fs + 10.0),
            metrics,
            text("Real-Time Thermal & Frequency Analysis").size(fs + 4.0),
            chart,
        ]
        .spacing(16)
        .width(Length::Fill);

        container(row![sidebar, main].spacing(24))
            .padding(20)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    // ── Subscriptions ─────────────────────────────────────────────────────────

    fn subscription(&self) -> Subscription<Message> {
        let config = Subscription::run(config_stream);
        if self.monitoring {
            Subscription::batch([config, Subscription::run(monitor_stream)])
        } else {
            config
        }
    }

    // ── Style ─────────────────────────────────────────────────────────────────

    fn style(&self, _theme: &iced::Theme) -> iced::theme::Style {
        iced::theme::Style {
            background_color: self.theme.background.to_iced(),
            text_color: self.theme.foreground.to_iced(),
        }
    }
}

/// Destination of an export taken at `at`.
fn export_path(cfg: &ExportConfig, at: chrono::DateTime<Local>) -> PathBuf {
    cfg.directory.join(export_file_name(at, &cfg.prefix))
}

async fn write_export(path: PathBuf, bytes: Vec<u8>) -> tele_core::Result<PathBuf> {
    match tokio::fs::write(&path, bytes).await {
        Ok(()) => Ok(path),
        Err(source) => Err(TeleError::Export { path, source }),
    }
}

// ── Subscription streams ──────────────────────────────────────────────────────
//
// Each free function acts as both the stream builder AND the unique identity
// key for `Subscription::run(fn_ptr)`.  Iced drops the stream when the
// subscription disappears from `subscription()`.

/// Runs one monitoring session: a fresh history, a monitor ticking into it,
/// and every rendered frame forwarded to the UI.  Dropping the stream drops
/// the `MonitorHandle`, which stops the loop.
fn monitor_stream() -> impl iced::futures::Stream<Item = Message> {
    iced::stream::channel(8, |mut sender: Sender<Message>| async move {
        let config = load_config(default_path()).unwrap_or_else(|e| {
            warn!("{e}; sampling with defaults");
            TelemetryConfig::default()
        });

        let history = SharedHistory::new(config.sampling.history_len);
        if sender.send(Message::SessionStarted(history.clone())).await.is_err() {
            return;
        }

        let sampler = Sampler::new(AdbReader::from_config(&config.device, &config.queries));
        let (renderer, mut frames) = ChannelRenderer::new(4);
        let _monitor = spawn_monitor(sampler, history, renderer, config.sampling.interval());

        while let Some(frame) = frames.recv().await {
            let _ = sender.try_send(Message::Frame(frame));
        }

        // Monitor task exited; keep the stream pending.
        loop {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    })
}

/// Watches the config file for writes and sends `ConfigReloaded`.
fn config_stream() -> impl iced::futures::Stream<Item = Message> {
    iced::stream::channel(1, |mut sender: Sender<Message>| async move {
        let (_watcher, mut rx) = ConfigWatcher::spawn(default_path());

        while rx.recv().await.is_some() {
            let _ = sender.try_send(Message::ConfigReloaded);
        }

        loop {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tele_core::Sample;

    fn frame(n: usize) -> Frame {
        Frame {
            samples: (0..n).map(|_| Sample::fallback(Local::now())).collect(),
            status:  DeviceStatus::Connected { model: "C7".into() },
        }
    }

    #[test]
    fn start_resets_session_state() {
        let mut d = Dashboard::with_config(TelemetryConfig::default());
        let _ = d.update(Message::Start);
        let history = SharedHistory::new(60);
        history.append(Sample::fallback(Local::now()));
        let _ = d.update(Message::SessionStarted(history));
        let _ = d.update(Message::Frame(frame(1)));
        assert_eq!(d.captured(), 1);

        let _ = d.update(Message::Stop);
        let _ = d.update(Message::Start);
        assert!(d.history.is_none());
        assert!(d.frame.samples.is_empty());
    }

    #[test]
    fn stop_keeps_history_for_export() {
        let mut d = Dashboard::with_config(TelemetryConfig::default());
        let _ = d.update(Message::Start);
        let history = SharedHistory::new(60);
        history.append(Sample::fallback(Local::now()));
        let _ = d.update(Message::SessionStarted(history));
        let _ = d.update(Message::Stop);

        assert!(!d.monitoring);
        assert_eq!(d.captured(), 1);
    }

    #[test]
    fn frames_after_stop_are_ignored() {
        let mut d = Dashboard::with_config(TelemetryConfig::default());
        let _ = d.update(Message::Start);
        let _ = d.update(Message::Frame(frame(2)));
        let _ = d.update(Message::Stop);
        let _ = d.update(Message::Frame(frame(5)));

        assert_eq!(d.frame.samples.len(), 2);
        assert_eq!(d.chart.primary.points.len(), 2);
    }

    #[test]
    fn export_path_uses_prefix_and_time() {
        let cfg = ExportConfig {
            directory: PathBuf::from("/data/captures"),
            prefix:    "c7_telemetry_".into(),
        };
        let at = Local.with_ymd_and_hms(2024, 5, 1, 14, 3, 9).unwrap();
        assert_eq!(export_path(&cfg, at), PathBuf::from("/data/captures/c7_telemetry_140309.csv"));
    }

    fn connected() -> DeviceStatus {
        DeviceStatus::Connected { model: "Redmi Note 4".into() }
    }

    #[test]
    fn identity_sets_status_before_first_start() {
        let mut d = Dashboard::with_config(TelemetryConfig::default());
        assert_eq!(d.frame.status, DeviceStatus::Disconnected);

        let _ = d.update(Message::Identified(connected()));
        assert_eq!(d.frame.status, connected());

        // Start keeps it until the first tick arrives.
        let _ = d.update(Message::Start);
        assert_eq!(d.frame.status, connected());
    }

    #[test]
    fn late_identity_does_not_override_ticks() {
        let mut d = Dashboard::with_config(TelemetryConfig::default());
        let _ = d.update(Message::Start);
        let _ = d.update(Message::Frame(frame(1)));
        let _ = d.update(Message::Identified(DeviceStatus::Disconnected));
        assert!(d.frame.status.is_connected());
    }

    #[tokio::test]
    async fn export_writes_csv_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c7_telemetry_120000.csv");
        let history = SharedHistory::new(60);
        history.append(Sample::fallback(Local::now()));

        let written = write_export(path.clone(), history.export()).await.unwrap();
        assert_eq!(written, path);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("timestamp,temperature,freq_little,freq_big,voltage\n"));
        assert_eq!(text.lines().count(), 2);
    }

    #[tokio::test]
    async fn export_to_missing_directory_is_an_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");

        let err = write_export(path.clone(), b"x".to_vec()).await.unwrap_err();
        assert!(matches!(&err, TeleError::Export { path: p, .. } if *p == path));
        assert!(err.to_string().contains("out.csv"));
    }
}
