use crate::metric::{card, metric_text};
use iced::Element;
use tele_core::Sample;
use tele_theme::Theme;

/// Displays the latest SoC temperature.
#[derive(Debug, Default)]
pub struct TempWidget;

impl TempWidget {
    pub fn new() -> Self {
        Self
    }

    pub fn text(latest: Option<&Sample>) -> String {
        metric_text(latest.map(|s| s.temperature_c), "°C")
    }

    pub fn view<'a, Message: 'a>(&'a self, latest: Option<&Sample>, theme: &Theme) -> Element<'a, Message> {
        card("SoC Temp", Self::text(latest), theme)
    }
}
