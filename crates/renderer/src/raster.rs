//! Offscreen PNG output of a [`DualAxisChart`], for hosts without a display.
//!
//! Same layout as the canvas view, drawn with `embedded-graphics` into an
//! [`RgbaImage`]. Text uses the ISO 8859-1 mono fonts so unit suffixes such
//! as `°C` survive.

use crate::canvas::{axis_value, plot_area, to_screen, GRID_DIVISIONS};
use crate::chart::{DualAxisChart, Series};
use embedded_graphics::mono_font::iso_8859_1::{FONT_6X10, FONT_7X13_BOLD};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::{Dimensions, DrawTarget, Drawable, OriginDimensions, Pixel, Point, Primitive, Size};
use embedded_graphics::primitives::{Circle, Line, Polyline, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyle, TextStyleBuilder};
use image::{ImageFormat, ImageResult, Rgba, RgbaImage};
use std::convert::Infallible;
use std::path::Path;
use tele_theme::{Color, Theme};

const LABEL_FONT: &MonoFont = &FONT_6X10;
const TITLE_FONT: &MonoFont = &FONT_7X13_BOLD;

const TOP_LEFT:     TextStyle = TextStyleBuilder::new().alignment(Alignment::Left).baseline(Baseline::Top).build();
const TOP_CENTER:   TextStyle = TextStyleBuilder::new().alignment(Alignment::Center).baseline(Baseline::Top).build();
const TOP_RIGHT:    TextStyle = TextStyleBuilder::new().alignment(Alignment::Right).baseline(Baseline::Top).build();
const MIDDLE_LEFT:  TextStyle = TextStyleBuilder::new().alignment(Alignment::Left).baseline(Baseline::Middle).build();
const MIDDLE_RIGHT: TextStyle = TextStyleBuilder::new().alignment(Alignment::Right).baseline(Baseline::Middle).build();

/// Legend swatch length in pixels.
const SWATCH: i32 = 18;

/// Draw `chart` into a `width × height` image.
pub fn rasterize(chart: &DualAxisChart, theme: &Theme, width: u32, height: u32) -> RgbaImage {
    let mut img = RgbaImage::new(width.max(1), height.max(1));
    let mut target = ImageTarget(&mut img);
    let size = target.size();
    let area = plot_area(iced::Size::new(size.width as f32, size.height as f32));

    target.clear(rgb(theme.background)).ok();
    draw_grid(&mut target, chart, theme, area);
    draw_time_axis(&mut target, chart, theme, area);
    draw_series(&mut target, chart, area, &chart.primary);
    draw_series(&mut target, chart, area, &chart.secondary);
    draw_header(&mut target, chart, theme, area);
    img
}

/// Rasterize `chart` and write it to `path` as PNG.
pub fn save_png(
    chart: &DualAxisChart,
    theme: &Theme,
    width: u32,
    height: u32,
    path: impl AsRef<Path>,
) -> ImageResult<()> {
    rasterize(chart, theme, width, height).save_with_format(path, ImageFormat::Png)
}

/// `DrawTarget` over an RGBA image; pixels outside the image are dropped.
struct ImageTarget<'a>(&'a mut RgbaImage);

impl OriginDimensions for ImageTarget<'_> {
    fn size(&self) -> Size {
        Size::new(self.0.width(), self.0.height())
    }
}

impl DrawTarget for ImageTarget<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (w, h) = self.0.dimensions();
        for Pixel(p, c) in pixels {
            if let (Ok(x), Ok(y)) = (u32::try_from(p.x), u32::try_from(p.y)) {
                if x < w && y < h {
                    self.0.put_pixel(x, y, Rgba([c.r(), c.g(), c.b(), 255]));
                }
            }
        }
        Ok(())
    }
}

fn draw_grid<D>(target: &mut D, chart: &DualAxisChart, theme: &Theme, area: iced::Rectangle)
where
    D: DrawTarget<Color = Rgb888>,
{
    let grid = PrimitiveStyle::with_stroke(rgb(over(theme.grid, 0.6, theme.background)), 1);
    let (left, right) = (&chart.primary, &chart.secondary);
    let ticks = left.range.ticks(GRID_DIVISIONS).into_iter().zip(right.range.ticks(GRID_DIVISIONS));

    for (i, (l, r)) in ticks.enumerate() {
        let y = px(to_screen(area, (0.0, i as f64 / GRID_DIVISIONS as f64))).y;
        let (x0, x1) = (area.x.round() as i32, (area.x + area.width).round() as i32);
        Line::new(Point::new(x0, y), Point::new(x1, y))
            .into_styled(grid)
            .draw(target)
            .ok();

        text(target, &axis_value(l, &left.range), Point::new(x0 - 6, y), left.color, MIDDLE_RIGHT);
        text(target, &axis_value(r, &right.range), Point::new(x1 + 6, y), right.color, MIDDLE_LEFT);
    }

    Rectangle::new(
        px(iced::Point::new(area.x, area.y)),
        Size::new(area.width.round() as u32 + 1, area.height.round() as u32 + 1),
    )
    .into_styled(PrimitiveStyle::with_stroke(rgb(theme.grid), 1))
    .draw(target)
    .ok();
}

/// Time-of-day ticks under the plot, then the optional axis caption.
fn draw_time_axis<D>(target: &mut D, chart: &DualAxisChart, theme: &Theme, area: iced::Rectangle)
where
    D: DrawTarget<Color = Rgb888>,
{
    let bottom = (area.y + area.height).round() as i32;
    for label in &chart.labels {
        let x = px(to_screen(area, (chart.x_range.project(label.x), 0.0))).x;
        text(target, &label.text, Point::new(x, bottom + 6), theme.foreground, TOP_CENTER);
    }
    if let Some(caption) = &chart.x_label {
        let x = (area.x + area.width / 2.0).round() as i32;
        text(target, caption, Point::new(x, bottom + 18), theme.foreground, TOP_CENTER);
    }
}

fn draw_series<D>(target: &mut D, chart: &DualAxisChart, area: iced::Rectangle, series: &Series)
where
    D: DrawTarget<Color = Rgb888>,
{
    let color = rgb(series.color);
    let points: Vec<Point> = series
        .points
        .iter()
        .map(|&p| px(to_screen(area, chart.unit_position(series, p))))
        .collect();

    match points.as_slice() {
        [] => {}
        [only] => {
            Circle::with_center(*only, stroke_width(series) + 2)
                .into_styled(PrimitiveStyle::with_fill(color))
                .draw(target)
                .ok();
        }
        _ => {
            Polyline::new(&points)
                .into_styled(PrimitiveStyle::with_stroke(color, stroke_width(series)))
                .draw(target)
                .ok();
        }
    }
}

/// Title centred on the top row; each axis title with its legend swatch
/// above its own side of the plot.
fn draw_header<D>(target: &mut D, chart: &DualAxisChart, theme: &Theme, area: iced::Rectangle)
where
    D: DrawTarget<Color = Rgb888>,
{
    let width = target.bounding_box().size.width as i32;
    if let Some(title) = &chart.title {
        let style = MonoTextStyle::new(TITLE_FONT, rgb(theme.foreground));
        Text::with_text_style(title, Point::new(width / 2, 6), style, TOP_CENTER)
            .draw(target)
            .ok();
    }

    let y = area.y.round() as i32 - 16;
    let mid = y + LABEL_FONT.character_size.height as i32 / 2;

    let left = &chart.primary;
    swatch(target, left, Point::new(4, mid));
    text(target, &left.name, Point::new(4 + SWATCH + 6, y), left.color, TOP_LEFT);

    let right = &chart.secondary;
    let name_x = width - 4;
    swatch(target, right, Point::new(name_x - text_width(&right.name) - 6 - SWATCH, mid));
    text(target, &right.name, Point::new(name_x, y), right.color, TOP_RIGHT);
}

fn swatch<D>(target: &mut D, series: &Series, start: Point)
where
    D: DrawTarget<Color = Rgb888>,
{
    Line::new(start, start + Point::new(SWATCH, 0))
        .into_styled(PrimitiveStyle::with_stroke(rgb(series.color), stroke_width(series)))
        .draw(target)
        .ok();
}

fn text<D>(target: &mut D, content: &str, position: Point, color: Color, style: TextStyle)
where
    D: DrawTarget<Color = Rgb888>,
{
    Text::with_text_style(content, position, MonoTextStyle::new(LABEL_FONT, rgb(color)), style)
        .draw(target)
        .ok();
}

fn text_width(content: &str) -> i32 {
    let advance = LABEL_FONT.character_size.width + LABEL_FONT.character_spacing;
    (content.chars().count() as u32 * advance) as i32
}

fn stroke_width(series: &Series) -> u32 {
    series.width.round().max(1.0) as u32
}

fn px(p: iced::Point) -> Point {
    Point::new(p.x.round() as i32, p.y.round() as i32)
}

fn rgb(c: Color) -> Rgb888 {
    let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgb888::new(byte(c.r), byte(c.g), byte(c.b))
}

/// `c` at opacity `alpha` composited onto `under`.
fn over(c: Color, alpha: f32, under: Color) -> Color {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |top: f32, bottom: f32| top * a + bottom * (1.0 - a);
    Color {
        r: mix(c.r, under.r),
        g: mix(c.g, under.g),
        b: mix(c.b, under.b),
        a: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::AxisRange;

    fn flat_chart() -> DualAxisChart {
        let temp = Series::new("Temp", Color::FIREBRICK, 3.0, AxisRange::new(0.0, 10.0))
            .with_points(vec![(0.0, 5.0), (10.0, 5.0)]);
        let freq = Series::new("Freq", Color::ROYALBLUE, 2.0, AxisRange::new(0.0, 10.0));
        DualAxisChart::new(None, temp, freq, Vec::new())
    }

    fn opaque(c: Color) -> Rgba<u8> {
        let p = rgb(c);
        Rgba([p.r(), p.g(), p.b(), 255])
    }

    /// Pixels of colour `c` in rows `rows`.
    fn count_in_rows(img: &RgbaImage, rows: std::ops::Range<u32>, c: Color) -> usize {
        let want = opaque(c);
        img.enumerate_pixels()
            .filter(|(_, y, p)| rows.contains(y) && **p == want)
            .count()
    }

    #[test]
    fn image_has_requested_size_and_background() {
        let theme = Theme::default();
        let img = rasterize(&flat_chart(), &theme, 400, 300);
        assert_eq!(img.dimensions(), (400, 300));
        assert_eq!(*img.get_pixel(1, 1), opaque(theme.background));
    }

    #[test]
    fn series_is_drawn_at_its_projected_height() {
        let img = rasterize(&flat_chart(), &Theme::default(), 400, 300);
        // Plot area is x 64..328, y 44..268; value 5 of 0..10 sits at y 156.
        assert_eq!(*img.get_pixel(196, 156), opaque(Color::FIREBRICK));
        assert_ne!(*img.get_pixel(196, 100), opaque(Color::FIREBRICK));
    }

    #[test]
    fn empty_series_leaves_no_trace() {
        let img = rasterize(&flat_chart(), &Theme::default(), 400, 300);
        let blue = opaque(Color::ROYALBLUE);
        let area = plot_area(iced::Size::new(400.0, 300.0));
        let mut inside = img.enumerate_pixels().filter(|(x, y, _)| {
            (*x as f32) > area.x + 1.0
                && (*x as f32) < area.x + area.width - 1.0
                && (*y as f32) > area.y + 1.0
                && (*y as f32) < area.y + area.height - 1.0
        });
        assert!(inside.all(|(_, _, p)| *p != blue));
    }

    #[test]
    fn title_is_drawn_on_the_top_row() {
        let theme = Theme::default();
        let mut titled = flat_chart();
        titled.title = Some("Kernel Thermal & Load Analysis".into());

        let plain = rasterize(&flat_chart(), &theme, 400, 300);
        let with_title = rasterize(&titled, &theme, 400, 300);

        assert!(plain != with_title);
        assert_eq!(count_in_rows(&plain, 0..22, theme.foreground), 0);
        assert!(count_in_rows(&with_title, 0..22, theme.foreground) > 0);
    }

    #[test]
    fn series_names_are_drawn() {
        let theme = Theme::default();
        let mut short = flat_chart();
        short.primary.name = "x".into();
        short.secondary.name = "y".into();
        let mut long = flat_chart();
        long.primary.name = "CPU Load (%)".into();
        long.secondary.name = "Temperature (°C)".into();

        let a = rasterize(&short, &theme, 400, 300);
        let b = rasterize(&long, &theme, 400, 300);
        assert!(a != b);
        // Both names sit in their series colour above the plot.
        assert!(count_in_rows(&b, 24..44, Color::FIREBRICK) > count_in_rows(&a, 24..44, Color::FIREBRICK));
        assert!(count_in_rows(&b, 24..44, Color::ROYALBLUE) > count_in_rows(&a, 24..44, Color::ROYALBLUE));
    }

    #[test]
    fn degree_sign_has_a_glyph() {
        let theme = Theme::default();
        let mut with_sign = flat_chart();
        with_sign.secondary.name = "Temp (°C)".into();
        let mut with_space = flat_chart();
        with_space.secondary.name = "Temp ( C)".into();

        let a = rasterize(&with_sign, &theme, 400, 300);
        let b = rasterize(&with_space, &theme, 400, 300);
        assert!(count_in_rows(&a, 24..44, Color::ROYALBLUE) > count_in_rows(&b, 24..44, Color::ROYALBLUE));
    }

    #[test]
    fn time_caption_is_drawn_below_the_ticks() {
        let theme = Theme::default();
        let captioned = flat_chart().with_x_label("Time (HH:MM:SS)");

        // Plot bottom is y 268; the caption occupies 286..296.
        let plain = rasterize(&flat_chart(), &theme, 400, 300);
        let with_caption = rasterize(&captioned, &theme, 400, 300);
        assert_eq!(count_in_rows(&plain, 280..300, theme.foreground), 0);
        assert!(count_in_rows(&with_caption, 280..300, theme.foreground) > 0);
    }

    #[test]
    fn png_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        save_png(&flat_chart(), &Theme::default(), 320, 200, &path).unwrap();

        let back = image::open(&path).unwrap();
        assert_eq!((back.width(), back.height()), (320, 200));
    }
}
