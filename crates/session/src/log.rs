use crate::error::{Result, SessionError};
use chrono::NaiveTime;
use std::path::{Path, PathBuf};

/// Timestamp format of the `Timestamp` column.
pub const TIME_FORMAT: &str = "%H:%M:%S";

const COL_TIMESTAMP: &str = "Timestamp";
const COL_CPU_LOAD:  &str = "CPU_Load";
const COL_TEMP:      &str = "Temp_C";

/// One row of a session log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogRow {
    pub timestamp: NaiveTime,
    /// CPU load in percent.
    pub cpu_load:  f64,
    /// Temperature in °C.
    pub temp_c:    f64,
}

/// A parsed session log, rows in file order.
#[derive(Debug, Clone)]
pub struct SessionLog {
    pub source: PathBuf,
    pub rows:   Vec<LogRow>,
}

impl SessionLog {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read and parse the log at `path`.
pub fn load_log(path: impl AsRef<Path>) -> Result<SessionLog> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = parse_log(&raw)?;
    tracing::debug!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(SessionLog {
        source: path.to_path_buf(),
        rows,
    })
}

/// Parse session log text. Columns are located by header name, so extra
/// columns and any column order are accepted. Blank lines are skipped.
pub fn parse_log(raw: &str) -> Result<Vec<LogRow>> {
    let mut lines = raw
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let (_, header) = lines.next().ok_or(SessionError::Empty)?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let index_of = |name: &'static str| {
        columns
            .iter()
            .position(|c| *c == name)
            .ok_or(SessionError::MissingColumn(name))
    };
    let ts_idx   = index_of(COL_TIMESTAMP)?;
    let load_idx = index_of(COL_CPU_LOAD)?;
    let temp_idx = index_of(COL_TEMP)?;

    lines
        .map(|(line, text)| {
            let fields: Vec<&str> = text.split(',').map(str::trim).collect();
            let field = |idx: usize, name: &str| {
                fields.get(idx).copied().ok_or_else(|| SessionError::BadRow {
                    line,
                    reason: format!("missing {name} field"),
                })
            };

            let ts = field(ts_idx, COL_TIMESTAMP)?;
            let timestamp = NaiveTime::parse_from_str(ts, TIME_FORMAT).map_err(|e| {
                SessionError::BadRow { line, reason: format!("bad timestamp '{ts}': {e}") }
            })?;

            Ok(LogRow {
                timestamp,
                cpu_load: number(field(load_idx, COL_CPU_LOAD)?, COL_CPU_LOAD, line)?,
                temp_c:   number(field(temp_idx, COL_TEMP)?, COL_TEMP, line)?,
            })
        })
        .collect()
}

fn number(raw: &str, name: &str, line: usize) -> Result<f64> {
    raw.parse::<f64>().map_err(|e| SessionError::BadRow {
        line,
        reason: format!("bad {name} '{raw}': {e}"),
    })
}
