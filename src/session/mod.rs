//! Session: the process-scoped owner of the task list
//!
//! A session holds the store, the notifier, the display mode and the deadline
//! watcher. The watcher is started with the session and stopped with it.

pub mod config;
pub mod watcher;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

use crate::alert::{notifier_for, NotifiedPolicy, Notifier, Permission};
use crate::task::{Task, TaskError, TaskId, TaskPriority, TaskStore};

pub use config::{load_config, save_config, AlertsConfig, Config, DisplayConfig};
pub use watcher::{AlertOutcome, DeadlineScanner, DeadlineWatcher, FiredAlert};

const APP_DIR_NAME: &str = "todo-alert";

/// Config directory: `$XDG_CONFIG_HOME/todo-alert` on Linux, `~/.todo-alert` elsewhere
pub fn get_app_dir() -> Result<PathBuf> {
    #[cfg(target_os = "linux")]
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot find config directory"))?
        .join(APP_DIR_NAME);

    #[cfg(not(target_os = "linux"))]
    let dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
        .join(format!(".{}", APP_DIR_NAME));

    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

/// Light/dark display mode. Has no effect on task data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Light,
    Dark,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl std::str::FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(format!("Invalid display mode: {s}. Use: light, dark")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub scan_interval: Duration,
    pub policy: NotifiedPolicy,
    pub display_mode: DisplayMode,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_millis(config::DEFAULT_SCAN_INTERVAL_MS),
            policy: NotifiedPolicy::default(),
            display_mode: DisplayMode::default(),
        }
    }
}

impl From<&Config> for SessionOptions {
    fn from(config: &Config) -> Self {
        Self {
            scan_interval: config.scan_interval(),
            policy: config.alerts.notified_policy,
            display_mode: config.display.mode,
        }
    }
}

pub struct Session {
    store: Arc<Mutex<TaskStore>>,
    notifier: Arc<dyn Notifier>,
    scanner: DeadlineScanner,
    display_mode: DisplayMode,
    alerts_rx: Option<mpsc::UnboundedReceiver<FiredAlert>>,
    watcher: Option<DeadlineWatcher>,
}

impl Session {
    /// Start a session and its deadline watcher. Must be called inside a Tokio runtime.
    pub fn start(options: SessionOptions, notifier: Arc<dyn Notifier>) -> Self {
        let store = Arc::new(Mutex::new(TaskStore::new()));
        let scanner = DeadlineScanner::new(store.clone(), notifier.clone(), options.policy);
        let (alerts_tx, alerts_rx) = mpsc::unbounded_channel();
        let watcher = DeadlineWatcher::spawn(scanner.clone(), options.scan_interval, alerts_tx);

        info!(
            interval_ms = options.scan_interval.as_millis() as u64,
            policy = ?options.policy,
            "Session started"
        );

        Self {
            store,
            notifier,
            scanner,
            display_mode: options.display_mode,
            alerts_rx: Some(alerts_rx),
            watcher: Some(watcher),
        }
    }

    /// Start a session using the notifier backend named in `config`
    pub fn from_config(config: &Config) -> Self {
        Self::start(config.into(), notifier_for(config.alerts.backend))
    }

    /// Receiver for alerts fired by the watcher. Can only be taken once.
    pub fn take_alerts(&mut self) -> Option<mpsc::UnboundedReceiver<FiredAlert>> {
        self.alerts_rx.take()
    }

    pub async fn add(
        &self,
        text: &str,
        priority: TaskPriority,
        deadline: Option<DateTime<Utc>>,
    ) -> Option<TaskId> {
        self.store.lock().await.add(text, priority, deadline)
    }

    pub async fn edit(
        &self,
        id: &TaskId,
        text: &str,
        priority: TaskPriority,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<Vec<Task>, TaskError> {
        let mut store = self.store.lock().await;
        store.edit(id, text, priority, deadline).map(<[Task]>::to_vec)
    }

    pub async fn toggle_completed(&self, id: &TaskId) -> Result<Vec<Task>, TaskError> {
        let mut store = self.store.lock().await;
        store.toggle_completed(id).map(<[Task]>::to_vec)
    }

    pub async fn delete(&self, id: &TaskId) -> Result<Vec<Task>, TaskError> {
        let mut store = self.store.lock().await;
        store.delete(id).map(<[Task]>::to_vec)
    }

    pub async fn clear(&self) -> Vec<Task> {
        self.store.lock().await.clear().to_vec()
    }

    /// Snapshot of the current list in display order
    pub async fn tasks(&self) -> Vec<Task> {
        self.store.lock().await.tasks().to_vec()
    }

    pub async fn get(&self, id: &TaskId) -> Option<Task> {
        self.store.lock().await.get(id).cloned()
    }

    /// Run one deadline scan immediately, as the watcher would at `now`
    pub async fn scan_now(&self, now: DateTime<Utc>) -> Vec<FiredAlert> {
        self.scanner.scan(now).await
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn toggle_display_mode(&mut self) -> DisplayMode {
        self.display_mode = self.display_mode.toggled();
        self.display_mode
    }

    pub fn policy(&self) -> NotifiedPolicy {
        self.scanner.policy()
    }

    /// Ask the notifier for permission. Only call this on user request.
    ///
    /// Backends may probe the host with a blocking command, so the request
    /// runs on the blocking pool.
    pub async fn request_permission(&self) -> Permission {
        let notifier = self.notifier.clone();
        let request = tokio::task::spawn_blocking(move || notifier.request_permission());
        let permission = match request.await {
            Ok(permission) => permission,
            Err(e) => {
                warn!(error = %e, "Permission request did not complete");
                self.notifier.permission()
            }
        };
        if permission.is_granted() {
            info!("Alert permission granted");
        } else {
            info!("Alert permission denied");
        }
        permission
    }

    pub fn permission(&self) -> Permission {
        self.notifier.permission()
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.as_ref().is_some_and(DeadlineWatcher::is_running)
    }

    /// Stop the watcher and wait for it to exit
    pub async fn shutdown(mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.stop().await;
        }
        info!("Session ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mode_toggle() {
        assert_eq!(DisplayMode::default(), DisplayMode::Light);
        assert_eq!(DisplayMode::Light.toggled(), DisplayMode::Dark);
        assert_eq!(DisplayMode::Dark.toggled(), DisplayMode::Light);
    }

    #[test]
    fn test_display_mode_parse() {
        assert_eq!("Dark".parse::<DisplayMode>(), Ok(DisplayMode::Dark));
        assert!("sepia".parse::<DisplayMode>().is_err());
    }

    #[test]
    fn test_options_from_config() {
        let mut config = Config::default();
        config.alerts.scan_interval_ms = 0;
        config.alerts.notified_policy = NotifiedPolicy::Delivered;
        let options = SessionOptions::from(&config);
        assert_eq!(options.scan_interval, Duration::from_millis(10));
        assert_eq!(options.policy, NotifiedPolicy::Delivered);
    }
}
