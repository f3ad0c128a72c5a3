use iced::{
    widget::{column, text},
    Element,
};
use tele_core::DeviceStatus;
use tele_theme::Theme;

/// Sidebar block: connection state and how many samples are retained.
///
/// Shows the disconnected state rather than hiding, so an unreachable
/// device is visible at a glance.
#[derive(Debug, Default)]
pub struct StatusWidget;

impl StatusWidget {
    pub fn new() -> Self {
        Self
    }

    pub fn connection_text(status: &DeviceStatus) -> String {
        match status {
            DeviceStatus::Connected { model } => format!("Connected to: {model}"),
            DeviceStatus::Disconnected        => "Device disconnected".to_string(),
        }
    }

    pub fn capture_text(captured: usize) -> String {
        match captured {
            0 => "No data captured yet. Press Start.".to_string(),
            1 => "Captured 1 data point".to_string(),
            n => format!("Captured {n} data points"),
        }
    }

    pub fn view<'a, Message: 'a>(&'a self, status: &DeviceStatus, captured: usize, theme: &Theme) -> Element<'a, Message> {
        let status_color = if status.is_connected() {
            theme.foreground
        } else {
            theme.accent
        };
        column![
            text(Self::connection_text(status)).size(theme.font_size).color(status_color.to_iced()),
            text(Self::capture_text(captured)).size(theme.font_size - 1.0),
        ]
        .spacing(6)
        .into()
    }
}
