use tele_core::format_value;
use tele_theme::Theme;
use iced::{
    widget::{column, container, text},
    Background, Border, Element, Length,
};

/// Shown in place of a value before the first sample arrives.
pub const PLACEHOLDER: &str = "—";

/// `"<value> <unit>"`, or [`PLACEHOLDER`] when there is no value yet.
pub fn metric_text(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{} {unit}", format_value(v)),
        None    => PLACEHOLDER.to_string(),
    }
}

/// Caption-over-value card used by every "latest value" widget.
pub fn card<'a, Message: 'a>(caption: &'a str, value: String, theme: &Theme) -> Element<'a, Message> {
    let bg = theme.grid.with_alpha(0.35).to_iced();
    container(
        column![
            text(caption).size(theme.font_size - 1.0).color(theme.accent.to_iced()),
            text(value).size(theme.font_size * 2.0).color(theme.foreground.to_iced()),
        ]
        .spacing(4),
    )
    .padding(12)
    .width(Length::Fill)
    .style(move |_: &iced::Theme| container::Style {
        background: Some(Background::Color(bg)),
        border: Border { radius: 8.0.into(), ..Default::default() },
        ..Default::default()
    })
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_value_with_unit() {
        assert_eq!(metric_text(Some(45.23), "°C"), "45.23 °C");
        assert_eq!(metric_text(Some(0.0), "V"), "0.0 V");
    }

    #[test]
    fn missing_value_is_placeholder() {
        assert_eq!(metric_text(None, "MHz"), PLACEHOLDER);
    }
}
