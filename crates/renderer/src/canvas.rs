use crate::chart::{AxisRange, DualAxisChart, Series};
use iced::widget::canvas::{self, Frame, Geometry, Path, Stroke, Text};
use iced::{mouse, Pixels, Point, Rectangle, Renderer, Size};
use tele_theme::{Color, Theme};

const MARGIN_LEFT:   f32 = 64.0;
const MARGIN_RIGHT:  f32 = 72.0;
const MARGIN_TOP:    f32 = 44.0;
const MARGIN_BOTTOM: f32 = 32.0;
pub(crate) const GRID_DIVISIONS: usize = 5;

/// Iced canvas program drawing a [`DualAxisChart`].
///
/// Stateless: every redraw lays the chart out from scratch for the current
/// bounds.
#[derive(Debug, Clone, Copy)]
pub struct ChartView<'a> {
    pub chart: &'a DualAxisChart,
    pub theme: &'a Theme,
}

impl<'a> ChartView<'a> {
    pub fn new(chart: &'a DualAxisChart, theme: &'a Theme) -> Self {
        Self { chart, theme }
    }
}

/// Inner plotting rectangle for a canvas of `size`.
pub(crate) fn plot_area(size: Size) -> Rectangle {
    Rectangle {
        x:      MARGIN_LEFT,
        y:      MARGIN_TOP,
        width:  (size.width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0),
        height: (size.height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
    }
}

pub(crate) fn to_screen(area: Rectangle, (ux, uy): (f64, f64)) -> Point {
    Point::new(
        area.x + ux as f32 * area.width,
        area.y + (1.0 - uy as f32) * area.height,
    )
}

impl<Message> canvas::Program<Message> for ChartView<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let area = plot_area(bounds.size());
        let font = self.theme.font_size - 2.0;

        self.draw_grid(&mut frame, area, font);
        self.draw_time_labels(&mut frame, area, font);
        self.draw_series(&mut frame, area, &self.chart.primary);
        self.draw_series(&mut frame, area, &self.chart.secondary);
        self.draw_legend(&mut frame, area, font);

        vec![frame.into_geometry()]
    }
}

impl ChartView<'_> {
    fn draw_grid(&self, frame: &mut Frame, area: Rectangle, font: f32) {
        let grid_color = self.theme.grid.with_alpha(0.6).to_iced();
        let grid = || Stroke::default().with_color(grid_color).with_width(1.0);
        let left  = &self.chart.primary;
        let right = &self.chart.secondary;

        let steps = left.range.ticks(GRID_DIVISIONS).into_iter().zip(right.range.ticks(GRID_DIVISIONS));
        for (i, (l, r)) in steps.enumerate() {
            let uy = i as f64 / GRID_DIVISIONS as f64;
            let y  = to_screen(area, (0.0, uy)).y;
            frame.stroke(
                &Path::line(Point::new(area.x, y), Point::new(area.x + area.width, y)),
                grid(),
            );

            let l_text = axis_value(l, &left.range);
            let l_x = area.x - 6.0 - text_width(&l_text, font);
            self.label(frame, l_text, Point::new(l_x, y - font / 2.0), left.color, font);
            self.label(frame, axis_value(r, &right.range), Point::new(area.x + area.width + 6.0, y - font / 2.0), right.color, font);
        }

        frame.stroke(
            &Path::rectangle(Point::new(area.x, area.y), area.size()),
            Stroke::default().with_color(self.theme.grid.to_iced()).with_width(1.0),
        );

        // Axis titles above each axis.
        let l_title_x = (area.x - text_width(&left.name, font) / 2.0).max(0.0);
        self.label(frame, left.name.clone(), Point::new(l_title_x, area.y - font * 1.8), left.color, font);
        let r_title_x = area.x + area.width - text_width(&right.name, font) / 2.0;
        self.label(frame, right.name.clone(), Point::new(r_title_x, area.y - font * 1.8), right.color, font);
    }

    fn draw_time_labels(&self, frame: &mut Frame, area: Rectangle, font: f32) {
        for label in &self.chart.labels {
            let ux = self.chart.x_range.project(label.x);
            let x = to_screen(area, (ux, 0.0)).x - text_width(&label.text, font) / 2.0;
            self.label(frame, label.text.clone(), Point::new(x, area.y + area.height + 6.0), self.theme.foreground, font);
        }
        if let Some(caption) = &self.chart.x_label {
            let x = area.x + (area.width - text_width(caption, font)) / 2.0;
            self.label(frame, caption.clone(), Point::new(x, area.y + area.height + 7.0 + font), self.theme.foreground, font);
        }
    }

    fn draw_series(&self, frame: &mut Frame, area: Rectangle, series: &Series) {
        if series.points.len() < 2 {
            if let Some(&p) = series.points.first() {
                let center = to_screen(area, self.chart.unit_position(series, p));
                frame.fill(&Path::circle(center, series.width + 1.0), series.color.to_iced());
            }
            return;
        }

        let line = Path::new(|b| {
            for (i, &p) in series.points.iter().enumerate() {
                let pt = to_screen(area, self.chart.unit_position(series, p));
                if i == 0 {
                    b.move_to(pt);
                } else {
                    b.line_to(pt);
                }
            }
        });
        frame.stroke(
            &line,
            Stroke::default().with_color(series.color.to_iced()).with_width(series.width),
        );
    }

    /// Horizontal legend above the top-right corner, plus the optional title
    /// on the left.
    fn draw_legend(&self, frame: &mut Frame, area: Rectangle, font: f32) {
        let y = 4.0;
        if let Some(title) = &self.chart.title {
            self.label(frame, title.clone(), Point::new(4.0, y), self.theme.foreground, font + 2.0);
        }

        let entries = [&self.chart.primary, &self.chart.secondary];
        let total: f32 = entries.iter().map(|s| 28.0 + text_width(&s.name, font) + 12.0).sum();
        let mut x = (area.x + area.width - total).max(area.x);
        for series in entries {
            let mid = y + font / 2.0;
            frame.stroke(
                &Path::line(Point::new(x, mid), Point::new(x + 22.0, mid)),
                Stroke::default().with_color(series.color.to_iced()).with_width(series.width),
            );
            x += 28.0;
            self.label(frame, series.name.clone(), Point::new(x, y), self.theme.foreground, font);
            x += text_width(&series.name, font) + 12.0;
        }
    }

    fn label(&self, frame: &mut Frame, content: String, position: Point, color: Color, size: f32) {
        frame.fill_text(Text {
            content,
            position,
            color: color.to_iced(),
            size: Pixels(size),
            ..Text::default()
        });
    }
}

/// Rough advance width of `text`; the canvas has no text measurement.
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.55
}

/// Tick label: whole numbers for wide windows, one decimal otherwise.
pub(crate) fn axis_value(value: f64, range: &AxisRange) -> String {
    if range.span() >= 50.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_area_respects_margins() {
        let area = plot_area(Size::new(800.0, 500.0));
        assert_eq!(area.x, MARGIN_LEFT);
        assert_eq!(area.width, 800.0 - MARGIN_LEFT - MARGIN_RIGHT);
        assert_eq!(area.height, 500.0 - MARGIN_TOP - MARGIN_BOTTOM);
    }

    #[test]
    fn plot_area_never_collapses() {
        let area = plot_area(Size::new(10.0, 10.0));
        assert_eq!(area.width, 1.0);
        assert_eq!(area.height, 1.0);
    }

    #[test]
    fn screen_y_grows_downwards() {
        let area = Rectangle { x: 0.0, y: 0.0, width: 100.0, height: 50.0 };
        assert_eq!(to_screen(area, (0.0, 1.0)), Point::new(0.0, 0.0));
        assert_eq!(to_screen(area, (1.0, 0.0)), Point::new(100.0, 50.0));
    }

    #[test]
    fn tick_labels_match_window_width() {
        assert_eq!(axis_value(500.0, &AxisRange::new(0.0, 2500.0)), "500");
        assert_eq!(axis_value(28.0, &AxisRange::new(20.0, 60.0)), "28.0");
    }
}
