//! Hot-reload watcher for the ambient [`PathfinderConfig`] (spec §6). The
//! enriched chain graph itself is not hot-reloaded — only the runtime
//! settings an already-running planner reads (log level, slippage
//! defaults, broker URLs).

use crate::config::{ConfigError, PathfinderConfig};
use crate::loader::ConfigLoader;
use crate::Result;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Watches a [`PathfinderConfig`] file for changes and swaps in the parsed
/// result atomically. The old config stays live until a new one parses
/// successfully.
pub struct ConfigWatcher {
    config: Arc<RwLock<PathfinderConfig>>,
    path: PathBuf,
}

impl ConfigWatcher {
    pub fn new(path: PathBuf) -> Result<Self> {
        let config = ConfigLoader::from_file(&path)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            path,
        })
    }

    pub fn get_config(&self) -> PathfinderConfig {
        self.config.read().expect("config lock poisoned").clone()
    }

    /// Spawns the watcher task. The returned handle runs until dropped.
    pub fn start_watching(&self) -> Result<JoinHandle<()>> {
        let config = Arc::clone(&self.config);
        let path = self.path.clone();

        let (tx, mut rx) = mpsc::channel(100);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Err(e) = tx.blocking_send(event) {
                        error!("failed to send file event: {e}");
                    }
                }
                Err(e) => error!("file watch error: {e}"),
            },
            notify::Config::default().with_poll_interval(Duration::from_secs(2)),
        )
        .map_err(|e| ConfigError::WatchError(e.to_string()))?;

        watcher
            .watch(&path, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::WatchError(e.to_string()))?;

        info!("watching config file: {:?}", path);

        let handle = tokio::spawn(async move {
            let _watcher = watcher;

            while let Some(event) = rx.recv().await {
                if matches!(event.kind, EventKind::Modify(_)) {
                    debug!("config file modified, reloading");

                    match ConfigLoader::from_file(&path) {
                        Ok(new_config) => match config.write() {
                            Ok(mut guard) => {
                                *guard = new_config;
                                info!("config reloaded");
                            }
                            Err(e) => error!("failed to acquire write lock for config reload: {e}"),
                        },
                        Err(e) => warn!("failed to reload config: {e}, keeping old config"),
                    }
                }
            }

            debug!("config watcher task stopped");
        });

        Ok(handle)
    }

    pub fn watch(path: PathBuf) -> Result<(Self, JoinHandle<()>)> {
        let watcher = Self::new(path)?;
        let handle = watcher.start_watching()?;
        Ok((watcher, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::time::{sleep, Duration};

    fn toml_with_log_level(level: &str) -> String {
        format!(
            r#"
[network]
log_level = "{level}"
metrics_enabled = true
metrics_port = 9090

[planner]
default_slippage_bps = 100
max_additional_hops = 2
pfm_timeout = "10m"

[resolver]
allow_live_lookup = false

[brokers]
osmosis_sqs_urls = []
skip_go_urls = []
health_check_interval_secs = 30
quote_timeout_secs = 10

[registry]
            "#
        )
    }

    #[tokio::test]
    async fn test_config_watcher_basic() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(toml_with_log_level("info").as_bytes()).unwrap();
        file.flush().unwrap();

        let watcher = ConfigWatcher::new(file.path().to_path_buf()).unwrap();
        let config = watcher.get_config();

        assert_eq!(config.network.log_level, "info");
    }

    #[tokio::test]
    async fn test_config_watcher_reload() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(toml_with_log_level("info").as_bytes()).unwrap();
        file.flush().unwrap();

        let path = file.path().to_path_buf();
        let (watcher, _handle) = ConfigWatcher::watch(path.clone()).unwrap();

        let config = watcher.get_config();
        assert_eq!(config.network.log_level, "info");

        sleep(Duration::from_millis(100)).await;
        std::fs::write(&path, toml_with_log_level("debug")).unwrap();
        sleep(Duration::from_secs(3)).await;

        let config = watcher.get_config();
        assert_eq!(config.network.log_level, "debug");
    }

    #[tokio::test]
    async fn test_config_watcher_invalid_update_keeps_old_config() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(toml_with_log_level("info").as_bytes()).unwrap();
        file.flush().unwrap();

        let path = file.path().to_path_buf();
        let (watcher, _handle) = ConfigWatcher::watch(path.clone()).unwrap();

        let config = watcher.get_config();
        assert_eq!(config.network.log_level, "info");

        sleep(Duration::from_millis(100)).await;
        std::fs::write(&path, "invalid toml {{[[]").unwrap();
        sleep(Duration::from_secs(3)).await;

        let config = watcher.get_config();
        assert_eq!(config.network.log_level, "info");
    }
}
