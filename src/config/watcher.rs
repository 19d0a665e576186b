//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself: editors that
//! save by writing a temporary file and renaming it over the original replace
//! the inode, which would silently end a watch on the file path.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::ServiceConfig;

/// Watches the configuration file and forwards every valid revision.
///
/// Invalid revisions are logged and dropped; the running handler tables stay
/// in place until a valid file appears.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<ServiceConfig>,
}

impl ConfigWatcher {
    /// Create a watcher and the receiver that yields reloaded configs.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ServiceConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, update_tx } = self;
        let reload_path = path.clone();
        let file_name: OsString = path
            .file_name()
            .ok_or_else(|| {
                notify::Error::generic("config path has no file name").add_path(path.clone())
            })?
            .to_os_string();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if is_config_event(&event, &file_name) => {
                    match load_config(&reload_path) {
                        Ok(config) => {
                            tracing::info!(
                                endpoints = config.endpoints.len(),
                                "Config change detected, reloading handler tables"
                            );
                            if update_tx.send(config).is_err() {
                                tracing::debug!("Config receiver dropped");
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Rejected config change, keeping current handlers");
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        let dir = watch_dir(&path);
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(
            path = %path.display(),
            dir = %dir.display(),
            "Config watcher started"
        );
        Ok(watcher)
    }
}

/// Directory holding the config file; a bare file name lives in `.`.
fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// A write, create or rename that leaves the config file in place.
fn is_config_event(event: &Event, file_name: &OsStr) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name))
}
