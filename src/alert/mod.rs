//! Deadline alert delivery
//!
//! The store decides *when* a task is due; a [`Notifier`] decides *how* the
//! user hears about it. Delivery is gated on a permission grant that is only
//! ever requested by explicit user action.

pub mod desktop;
pub mod terminal;

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use desktop::DesktopNotifier;
pub use terminal::TerminalNotifier;

use crate::task::AlertEvent;

pub const ALERT_TITLE: &str = "Task Deadline";

/// Body text shown for a task whose deadline has passed
pub fn alert_body(text: &str) -> String {
    format!("Deadline approaching: {}", text)
}

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Alert backend unavailable: {0}")]
    Unavailable(String),

    #[error("Alert command failed: {0}")]
    CommandFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Permission to show alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Not requested yet
    #[default]
    Default,
    Granted,
    Denied,
}

impl Permission {
    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Default => "not requested",
            Self::Granted => "granted",
            Self::Denied => "denied",
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            Self::Default => 0,
            Self::Granted => 1,
            Self::Denied => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Granted,
            2 => Self::Denied,
            _ => Self::Default,
        }
    }
}

/// Permission cell shared between the shell and the deadline watcher
#[derive(Debug, Default)]
pub struct PermissionState(AtomicU8);

impl PermissionState {
    pub fn get(&self) -> Permission {
        Permission::from_u8(self.0.load(Ordering::SeqCst))
    }

    pub fn set(&self, permission: Permission) {
        self.0.store(permission.to_u8(), Ordering::SeqCst);
    }
}

/// Host capability that can show a one-shot alert
pub trait Notifier: Send + Sync {
    /// Ask the host for permission. Only called on explicit user action.
    fn request_permission(&self) -> Permission;

    /// Current permission, without prompting
    fn permission(&self) -> Permission;

    /// Show an alert. Callers check [`Notifier::permission`] first.
    fn notify(&self, title: &str, body: &str) -> Result<(), AlertError>;

    /// Show the alert for a deadline event
    fn notify_event(&self, event: &AlertEvent) -> Result<(), AlertError> {
        self.notify(ALERT_TITLE, &alert_body(&event.text))
    }
}

/// What `notified = true` means for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifiedPolicy {
    /// Marked when the scan sees the deadline pass, whether or not the alert
    /// could be shown. A suppressed alert is never retried.
    #[default]
    Attempted,
    /// Marked only after the alert was shown. While permission is missing the
    /// task stays pending and alerts once permission is granted.
    Delivered,
}

impl std::str::FromStr for NotifiedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "attempted" | "attempt" => Ok(Self::Attempted),
            "delivered" | "deliver" => Ok(Self::Delivered),
            _ => Err(format!(
                "Invalid notified policy: {s}. Use: attempted, delivered"
            )),
        }
    }
}

/// Which [`Notifier`] implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertBackend {
    /// Desktop notification via notify-send / osascript
    #[default]
    Desktop,
    /// Bell and message on the terminal
    Terminal,
}

impl std::str::FromStr for AlertBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "desktop" => Ok(Self::Desktop),
            "terminal" | "term" => Ok(Self::Terminal),
            _ => Err(format!("Invalid alert backend: {s}. Use: desktop, terminal")),
        }
    }
}

/// Build the notifier for a backend
pub fn notifier_for(backend: AlertBackend) -> Arc<dyn Notifier> {
    match backend {
        AlertBackend::Desktop => Arc::new(DesktopNotifier::new()),
        AlertBackend::Terminal => Arc::new(TerminalNotifier::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_body() {
        assert_eq!(alert_body("Buy milk"), "Deadline approaching: Buy milk");
    }

    #[test]
    fn test_permission_state_roundtrip() {
        let state = PermissionState::default();
        assert_eq!(state.get(), Permission::Default);
        state.set(Permission::Denied);
        assert_eq!(state.get(), Permission::Denied);
        state.set(Permission::Granted);
        assert!(state.get().is_granted());
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "Delivered".parse::<NotifiedPolicy>().unwrap(),
            NotifiedPolicy::Delivered
        );
        assert_eq!(
            "attempted".parse::<NotifiedPolicy>().unwrap(),
            NotifiedPolicy::Attempted
        );
        assert!("sometimes".parse::<NotifiedPolicy>().is_err());
        assert_eq!(NotifiedPolicy::default(), NotifiedPolicy::Attempted);
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!(
            "terminal".parse::<AlertBackend>().unwrap(),
            AlertBackend::Terminal
        );
        assert_eq!(
            "DESKTOP".parse::<AlertBackend>().unwrap(),
            AlertBackend::Desktop
        );
        assert!("pager".parse::<AlertBackend>().is_err());
    }

    #[test]
    fn test_policy_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: NotifiedPolicy,
        }
        let w: Wrapper = toml::from_str(r#"policy = "delivered""#).unwrap();
        assert_eq!(w.policy, NotifiedPolicy::Delivered);
    }
}
