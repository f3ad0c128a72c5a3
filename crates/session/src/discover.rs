use crate::error::{Result, SessionError};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Pick the most recently created `<prefix>*.csv` file in `dir`.
///
/// Uses modification time on platforms without creation time. Ties go to
/// the lexicographically greatest name so the choice is deterministic.
pub fn latest_log(dir: impl AsRef<Path>, prefix: &str) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let io_err = |source| SessionError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut best: Option<(SystemTime, PathBuf)> = None;
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if !is_candidate(&path, prefix) {
            continue;
        }

        let meta = match entry.metadata() {
            Ok(m) if m.is_file() => m,
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!("Skipping '{}': {e}", path.display());
                continue;
            }
        };
        let Ok(stamp) = meta.created().or_else(|_| meta.modified()) else {
            continue;
        };

        let newer = match &best {
            None => true,
            Some((best_stamp, best_path)) => (stamp, &path) > (*best_stamp, best_path),
        };
        if newer {
            best = Some((stamp, path));
        }
    }

    best.map(|(_, path)| path).ok_or_else(|| SessionError::NoLogFiles {
        dir: dir.to_path_buf(),
        prefix: prefix.to_string(),
    })
}

/// An explicitly named file wins; otherwise the latest log in `dir`.
pub fn resolve(explicit: Option<&Path>, dir: impl AsRef<Path>, prefix: &str) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => latest_log(dir, prefix),
    }
}

fn is_candidate(path: &Path, prefix: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(prefix) && n.ends_with(".csv"))
}
