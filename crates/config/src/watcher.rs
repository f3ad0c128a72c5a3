use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Watches the config file and sends a notification whenever it is written,
/// created or replaced.
///
/// The parent directory is watched rather than the file itself, so the file
/// may not exist yet and editors that save by rename are still picked up.
///
/// # Example
/// ```no_run
/// # async fn demo() {
/// let (_watcher, mut rx) = tele_config::ConfigWatcher::spawn(tele_config::default_path());
/// while rx.recv().await.is_some() {
///     println!("config changed, reloading");
/// }
/// # }
/// ```
pub struct ConfigWatcher {
    path: PathBuf,
}

impl ConfigWatcher {
    /// Spawn a filesystem watcher for `path`.
    /// Returns the watcher handle and a receiver that fires on every detected change.
    pub fn spawn(path: impl AsRef<Path>) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        let path = path.as_ref().to_path_buf();
        let watcher = Self { path: path.clone() };

        tokio::spawn(watch_loop(path, tx));

        (watcher, rx)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn watch_loop(path: PathBuf, tx: mpsc::Sender<()>) {
    use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
    use std::time::Duration;

    let Some(file_name) = path.file_name().map(OsString::from) else {
        error!("Config path '{}' has no file name; not watching", path.display());
        return;
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let (sync_tx, mut sync_rx) = mpsc::channel::<notify::Result<Event>>(16);

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = sync_tx.blocking_send(res);
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create filesystem watcher: {e}");
            return;
        }
    };

    if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
        warn!("Cannot watch '{}' (config reload disabled): {e}", dir.display());
        return;
    }

    info!("Watching config file: {}", path.display());

    while let Some(event) = sync_rx.recv().await {
        match event {
            Ok(e) if touches(&e, &file_name) => {
                use notify::EventKind::*;
                if matches!(e.kind, Modify(_) | Create(_)) && tx.send(()).await.is_err() {
                    break; // receiver dropped
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Watcher error: {e}"),
        }
    }
}

fn touches(event: &notify::Event, file_name: &OsString) -> bool {
    event
        .paths
        .iter()
        .any(|p| p.file_name().is_some_and(|n| n == file_name.as_os_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::{event::CreateKind, Event, EventKind};

    #[test]
    fn only_events_for_the_config_file_count() {
        let name = OsString::from("telemetry.toml");
        let hit = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/cfg/soc-telemetry/telemetry.toml"));
        let miss = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/cfg/soc-telemetry/telemetry.toml.swp"));
        assert!(touches(&hit, &name));
        assert!(!touches(&miss, &name));
    }
}
