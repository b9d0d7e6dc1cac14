//! Rule file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::ConfigError;
use crate::config::schema::RoutingConfig;
use crate::config::source::{FileSource, RuleSetSource};

/// Result of one reload attempt.
pub type ConfigUpdate = Result<RoutingConfig, ConfigError>;

/// A watcher that monitors the rule file for changes.
pub struct ConfigWatcher {
    source: FileSource,
    update_tx: mpsc::UnboundedSender<ConfigUpdate>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for reload results, successful or not.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ConfigUpdate>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                source: FileSource::new(path),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching in a background thread.
    ///
    /// The parent directory is watched rather than the file itself so that
    /// editors which save by rename are still picked up. A blank read is
    /// treated as a save in progress and produces no update. The returned
    /// watcher must be kept alive for events to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.source.path().to_path_buf();
        let dir = watch_dir(&path);
        let tx = self.update_tx;
        let source = self.source;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !is_relevant(&event, source.path()) {
                        return;
                    }
                    let Some(update) = source.load_settled() else {
                        tracing::debug!(path = %source.describe(), "Rule file is blank, waiting for content");
                        return;
                    };
                    tracing::info!(path = %source.describe(), "Rule file change detected, reloading...");
                    if let Err(e) = &update {
                        tracing::error!("Failed to reload rules: {}. Keeping current rule set.", e);
                    }
                    let _ = tx.send(update);
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Rule file watcher started");
        Ok(watcher)
    }
}

fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// True when `event` is a write, create or rename touching `path`.
///
/// Removals are ignored: a missing file loads as an empty rule file, and
/// some editors delete before writing.
pub fn is_relevant(event: &Event, path: &Path) -> bool {
    let kind_matches = event.kind.is_modify() || event.kind.is_create();
    let file_name = path.file_name();
    kind_matches
        && event
            .paths
            .iter()
            .any(|p| p == path || (file_name.is_some() && p.file_name() == file_name))
}
