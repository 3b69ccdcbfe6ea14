//! JSON-file settings store with a polling reload watcher.
//!
//! The file holds one serialized [`ApiSettings`] snapshot. A background
//! task re-reads it on an interval and publishes changed snapshots into a
//! watch channel - the supervisor only ever sees the newest value.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use palmchat_core::settings::ApiSettings;

/// Load the settings file, creating it with defaults when absent.
pub fn load_or_init(path: &Path) -> anyhow::Result<ApiSettings> {
    if path.exists() {
        return read_settings(path);
    }

    let settings = ApiSettings::with_defaults();
    let serialized = serde_json::to_string_pretty(&settings)?;
    std::fs::write(path, serialized)
        .with_context(|| format!("writing default settings to {}", path.display()))?;
    tracing::info!(path = %path.display(), "Created settings file with defaults");
    Ok(settings)
}

fn read_settings(path: &Path) -> anyhow::Result<ApiSettings> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing settings from {}", path.display()))
}

/// Spawn the reload watcher.
///
/// Returns the receiver (seeded with `initial`, so subscribers get a value
/// promptly) and the watcher task handle. Aborting the task drops the
/// sender, which the supervisor observes as end-of-stream.
pub fn spawn_watcher(
    path: PathBuf,
    initial: ApiSettings,
    poll: Duration,
) -> (watch::Receiver<ApiSettings>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(initial);

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match read_settings(&path) {
                Ok(settings) => {
                    tx.send_if_modified(|current| {
                        if *current == settings {
                            false
                        } else {
                            *current = settings;
                            true
                        }
                    });
                }
                Err(err) => {
                    // A half-written or broken file keeps the last good
                    // snapshot in effect.
                    tracing::warn!(error = %err, "Settings reload failed; keeping current snapshot");
                }
            }
            if tx.is_closed() {
                return;
            }
        }
    });

    (rx, handle)
}
