use crate::metric::{card, metric_text};
use iced::Element;
use tele_core::Sample;
use tele_theme::Theme;

/// Displays the latest battery voltage.
#[derive(Debug, Default)]
pub struct BatteryWidget;

impl BatteryWidget {
    pub fn new() -> Self {
        Self
    }

    pub fn text(latest: Option<&Sample>) -> String {
        metric_text(latest.map(|s| s.voltage_v), "V")
    }

    pub fn view<'a, Message: 'a>(&'a self, latest: Option<&Sample>, theme: &Theme) -> Element<'a, Message> {
        card("Battery", Self::text(latest), theme)
    }
}
