use anyhow::Context;
use chrono::NaiveTime;
use clap::Parser;
use iced::{
    widget::{canvas, container},
    Element, Length, Size, Task,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tele_config::{default_path, load as load_config, TelemetryConfig};
use tele_renderer::{save_png, time_labels, AxisRange, ChartView, DualAxisChart, Series};
use tele_session::{load_log, resolve, SessionLog, TIME_FORMAT};
use tele_theme::{Color, Theme};
use tracing::{error, info, warn};

const TITLE: &str = "Kernel Thermal & Load Analysis";

/// matplotlib "tab:blue" / "tab:red", the palette session plots have always used.
const LOAD_COLOR: Color = Color { r: 0.122, g: 0.467, b: 0.706, a: 1.0 }; // #1f77b4
const TEMP_COLOR: Color = Color { r: 0.839, g: 0.153, b: 0.157, a: 1.0 }; // #d62728

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Plot an offline kernel session log (`Timestamp,CPU_Load,Temp_C`).
#[derive(Debug, Parser)]
#[command(name = "tele-plot", version)]
struct Cli {
    /// Log to plot. Defaults to the newest `<session.prefix>*.csv` in `session.directory`.
    file: Option<PathBuf>,

    /// PNG file to write.
    #[arg(short, long, default_value = "kernel_analysis_neat.png")]
    output: PathBuf,

    /// Image size in pixels, `WIDTHxHEIGHT`.
    #[arg(long, default_value = "1200x600", value_parser = parse_size)]
    size: (u32, u32),

    /// Open an interactive window instead of writing a PNG.
    #[arg(long)]
    window: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(default_path()).unwrap_or_else(|e| {
        warn!("{e}; using defaults");
        TelemetryConfig::default()
    });

    let path = resolve(cli.file.as_deref(), &config.session.directory, &config.session.prefix)?;
    let log = load_log(&path).with_context(|| format!("cannot plot '{}'", path.display()))?;
    info!("Successfully plotted {} data points.", log.len());

    let chart = session_chart(&log);
    let theme = Theme::from_config(&config.theme);

    if cli.window {
        let viewer = Viewer { chart, theme };
        iced::application(move || (viewer.clone(), Task::none()), Viewer::update, Viewer::view)
            .title(TITLE)
            .style(Viewer::style)
            .window_size(Size::new(cli.size.0 as f32, cli.size.1 as f32))
            .run()?;
    } else {
        let (width, height) = cli.size;
        save_png(&chart, &theme, width, height, &cli.output)
            .with_context(|| format!("cannot write '{}'", cli.output.display()))?;
        info!("Graph saved as: {}", cli.output.display());
    }
    Ok(())
}

fn parse_size(raw: &str) -> Result<(u32, u32), String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{raw}'"))?;
    let dim = |s: &str| match s.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("bad dimension '{s}' in '{raw}'")),
    };
    Ok((dim(w)?, dim(h)?))
}

// ── Chart ─────────────────────────────────────────────────────────────────────

/// CPU load on the left axis, temperature on the right, both fitted to the
/// data.  x is seconds since the first row.
fn session_chart(log: &SessionLog) -> DualAxisChart {
    let xs = elapsed_seconds(log.rows.iter().map(|r| r.timestamp));

    let load = Series::new(
        "CPU Load (%)",
        LOAD_COLOR,
        2.0,
        AxisRange::fit(log.rows.iter().map(|r| r.cpu_load), 0.05),
    )
    .with_points(xs.iter().zip(&log.rows).map(|(x, r)| (*x, r.cpu_load)).collect());

    let temp = Series::new(
        "Temperature (°C)",
        TEMP_COLOR,
        2.5,
        AxisRange::fit(log.rows.iter().map(|r| r.temp_c), 0.05),
    )
    .with_points(xs.iter().zip(&log.rows).map(|(x, r)| (*x, r.temp_c)).collect());

    let labels = time_labels(&xs, |i| log.rows[i].timestamp.format(TIME_FORMAT).to_string());
    let source = log
        .source
        .file_name()
        .map_or_else(|| log.source.display().to_string(), |n| n.to_string_lossy().into_owned());

    DualAxisChart::new(Some(format!("{TITLE}  ·  Source: {source}")), load, temp, labels)
        .with_x_label("Time (HH:MM:SS)")
}

/// Seconds since the first timestamp.  Logs carry only a time of day, so a
/// step backwards is read as crossing midnight.
fn elapsed_seconds(times: impl IntoIterator<Item = NaiveTime>) -> Vec<f64> {
    let mut out = Vec::new();
    let mut first: Option<NaiveTime> = None;
    let mut days = 0.0;
    let mut prev = 0.0;

    for t in times {
        let origin = *first.get_or_insert(t);
        let mut x = (t - origin).num_milliseconds() as f64 / 1_000.0 + days;
        if x < prev {
            days += SECONDS_PER_DAY;
            x += SECONDS_PER_DAY;
        }
        prev = x;
        out.push(x);
    }
    out
}

// ── Window ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Viewer {
    chart: DualAxisChart,
    theme: Theme,
}

impl Viewer {
    fn update(&mut self, _message: ()) {}

    fn view(&self) -> Element<'_, ()> {
        container(
            canvas(ChartView::new(&self.chart, &self.theme))
                .width(Length::Fill)
                .height(Length::Fill),
        )
        .padding(20)
        .into()
    }

    fn style(&self, _theme: &iced::Theme) -> iced::theme::Style {
        iced::theme::Style {
            background_color: self.theme.background.to_iced(),
            text_color: self.theme.foreground.to_iced(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tele_session::parse_log;

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn log(raw: &str) -> SessionLog {
        SessionLog {
            source: PathBuf::from("/logs/kernel_log_0930.csv"),
            rows:   parse_log(raw).unwrap(),
        }
    }

    #[test]
    fn elapsed_is_relative_to_first_row() {
        assert_eq!(elapsed_seconds([t(9, 30, 0), t(9, 30, 2), t(9, 31, 0)]), vec![0.0, 2.0, 60.0]);
        assert!(elapsed_seconds([]).is_empty());
    }

    #[test]
    fn elapsed_wraps_past_midnight() {
        assert_eq!(elapsed_seconds([t(23, 59, 59), t(0, 0, 1)]), vec![0.0, 2.0]);
    }

    #[test]
    fn chart_fits_both_axes_and_names_source() {
        let chart = session_chart(&log("Timestamp,CPU_Load,Temp_C\n09:30:00,10,40\n09:30:01,30,50\n"));

        assert_eq!(chart.primary.name, "CPU Load (%)");
        assert_eq!(chart.secondary.name, "Temperature (°C)");
        assert_eq!(chart.secondary.width, 2.5);
        assert!((chart.primary.range.min - 9.0).abs() < 1e-9);
        assert!((chart.primary.range.max - 31.0).abs() < 1e-9);
        assert_eq!(chart.secondary.points, vec![(0.0, 40.0), (1.0, 50.0)]);
        assert!(chart.title.as_deref().is_some_and(|t| t.ends_with("kernel_log_0930.csv")));
        assert_eq!(chart.labels.first().map(|l| l.text.as_str()), Some("09:30:00"));
        assert_eq!(chart.x_label.as_deref(), Some("Time (HH:MM:SS)"));
    }

    #[test]
    fn size_flag_parses_dimensions() {
        assert_eq!(parse_size("1200x600"), Ok((1200, 600)));
        assert_eq!(parse_size("640X480"), Ok((640, 480)));
        assert!(parse_size("1200").is_err());
        assert!(parse_size("0x600").is_err());
    }

    #[test]
    fn defaults_write_the_neat_png() {
        let cli = Cli::try_parse_from(["tele-plot"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("kernel_analysis_neat.png"));
        assert_eq!(cli.size, (1200, 600));
        assert!(!cli.window);
        assert!(cli.file.is_none());

        let cli = Cli::try_parse_from(["tele-plot", "--window", "kernel_log_1.csv"]).unwrap();
        assert!(cli.window);
        assert_eq!(cli.file, Some(PathBuf::from("kernel_log_1.csv")));
    }

    #[test]
    fn headless_run_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("kernel_log_0930.csv");
        std::fs::write(&log, "Timestamp,CPU_Load,Temp_C\n09:30:00,10,40\n09:30:01,30,50\n").unwrap();
        let out = dir.path().join("out.png");

        let cli = Cli::try_parse_from([
            "tele-plot".as_ref(),
            log.as_os_str(),
            "--output".as_ref(),
            out.as_os_str(),
            "--size".as_ref(),
            "400x200".as_ref(),
        ])
        .unwrap();
        run(cli).unwrap();

        let png = std::fs::read(&out).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn missing_log_is_returned_to_main() {
        let cli = Cli::try_parse_from(["tele-plot", "/nonexistent/kernel_log_0000.csv"]).unwrap();
        let err = run(cli).unwrap_err();
        assert!(format!("{err:#}").contains("cannot plot '/nonexistent/kernel_log_0000.csv'"));
    }

    #[test]
    fn header_only_log_gives_empty_chart() {
        let chart = session_chart(&log("Timestamp,CPU_Load,Temp_C\n"));
        assert!(chart.primary.points.is_empty());
        assert!(chart.labels.is_empty());
    }
}
