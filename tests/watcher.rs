//! Hot reload through the real file watcher.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use link_router::config::{ConfigUpdate, ConfigWatcher, FileSource, RuleConfig};
use link_router::dispatch::invoker::RecordingInvoker;
use link_router::Dispatcher;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

mod common;
use common::{config, write_config, CHROME, FIREFOX, SAFARI};

const WAIT: Duration = Duration::from_secs(10);

/// Receive updates until one satisfies `done`, returning everything seen.
async fn collect_until(
    updates: &mut UnboundedReceiver<ConfigUpdate>,
    done: impl Fn(&ConfigUpdate) -> bool,
) -> Vec<ConfigUpdate> {
    let mut seen = Vec::new();
    loop {
        let update = tokio::time::timeout(WAIT, updates.recv())
            .await
            .expect("timed out waiting for a rule file update")
            .expect("watcher channel closed");
        let finished = done(&update);
        seen.push(update);
        if finished {
            return seen;
        }
    }
}

fn routes_to(update: &ConfigUpdate, handler: &str) -> bool {
    matches!(update, Ok(c) if c.rules.first().is_some_and(|r| r.handler_target == handler))
}

fn file_dispatcher(path: &Path) -> Dispatcher {
    let dispatcher = Dispatcher::new(
        Arc::new(FileSource::new(path)),
        Arc::new(RecordingInvoker::default()),
        SAFARI,
    );
    dispatcher.reload().unwrap();
    dispatcher
}

#[tokio::test]
async fn test_rewrite_is_delivered_and_applied() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        dir.path(),
        "config.json",
        &config(vec![RuleConfig::new(&["github.com"], &[], CHROME)], ""),
    );
    let dispatcher = file_dispatcher(&path);

    let (watcher, mut updates) = ConfigWatcher::new(&path);
    let _watcher = watcher.run().unwrap();

    write_config(
        dir.path(),
        "config.json",
        &config(vec![RuleConfig::new(&["github.com"], &[], FIREFOX)], ""),
    );

    for update in collect_until(&mut updates, |u| routes_to(u, FIREFOX)).await {
        dispatcher.apply(update).unwrap();
    }
    assert_eq!(dispatcher.resolve("https://github.com/x").as_str(), FIREFOX);
    assert!(dispatcher.config_error().is_none());
}

#[tokio::test]
async fn test_malformed_rewrite_keeps_last_known_good() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        dir.path(),
        "config.json",
        &config(vec![RuleConfig::new(&["github.com"], &[], CHROME)], FIREFOX),
    );
    let dispatcher = file_dispatcher(&path);

    let (watcher, mut updates) = ConfigWatcher::new(&path);
    let _watcher = watcher.run().unwrap();

    fs::write(&path, "{ \"rules\": [").unwrap();

    let seen = collect_until(&mut updates, |u| u.is_err()).await;
    for update in seen {
        let _ = dispatcher.apply(update);
    }

    assert!(dispatcher.config_error().is_some());
    assert_eq!(dispatcher.resolve("https://github.com/x").as_str(), CHROME);
    assert_eq!(dispatcher.resolve("https://example.com").as_str(), FIREFOX);
}

#[tokio::test]
async fn test_truncate_then_write_never_delivers_empty_rules() {
    let dir = TempDir::new().unwrap();
    let rules = config(vec![RuleConfig::new(&["github.com"], &[], CHROME)], "");
    let path = write_config(dir.path(), "config.json", &rules);
    let dispatcher = file_dispatcher(&path);

    let (watcher, mut updates) = ConfigWatcher::new(&path);
    let _watcher = watcher.run().unwrap();

    // In-place save: the file sits empty for a while before the new content lands.
    let mut file = OpenOptions::new().write(true).truncate(true).open(&path).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    file.write_all(serde_json::to_string_pretty(&rules).unwrap().as_bytes())
        .unwrap();
    file.flush().unwrap();
    drop(file);

    let seen = collect_until(&mut updates, |u| routes_to(u, CHROME)).await;
    for update in seen {
        let config = update.expect("save in progress must not surface as an error");
        assert_eq!(config.rules.len(), 1, "rule set emptied mid-save");
        dispatcher.apply(Ok(config)).unwrap();
    }
    assert_eq!(dispatcher.resolve("https://github.com").as_str(), CHROME);
}
