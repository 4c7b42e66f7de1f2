//! Periodic deadline watcher
//!
//! Ticks on a fixed interval, scans the store against the current time and
//! hands each fired alert to the notifier and to the shell.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::alert::{NotifiedPolicy, Notifier};
use crate::task::{AlertEvent, TaskStore};

/// `tokio::time::interval` panics on a zero period
pub const MIN_SCAN_INTERVAL: Duration = Duration::from_millis(10);

/// What happened when a fired alert was handed to the notifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertOutcome {
    Shown,
    /// Permission was not granted at scan time
    NotPermitted,
    /// The notifier was allowed to show it but failed
    Failed(String),
}

/// An alert the scan fired, and what the notifier did with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredAlert {
    pub event: AlertEvent,
    pub outcome: AlertOutcome,
}

impl FiredAlert {
    pub fn delivered(&self) -> bool {
        self.outcome == AlertOutcome::Shown
    }
}

/// One scan pass over the shared store, applying the notified policy
#[derive(Clone)]
pub struct DeadlineScanner {
    store: Arc<Mutex<TaskStore>>,
    notifier: Arc<dyn Notifier>,
    policy: NotifiedPolicy,
}

impl DeadlineScanner {
    pub fn new(
        store: Arc<Mutex<TaskStore>>,
        notifier: Arc<dyn Notifier>,
        policy: NotifiedPolicy,
    ) -> Self {
        Self {
            store,
            notifier,
            policy,
        }
    }

    pub fn policy(&self) -> NotifiedPolicy {
        self.policy
    }

    pub async fn scan(&self, now: DateTime<Utc>) -> Vec<FiredAlert> {
        let permission = self.notifier.permission();

        match self.policy {
            NotifiedPolicy::Attempted => {
                let events = self.store.lock().await.scan_deadlines(now);
                events
                    .into_iter()
                    .map(|event| {
                        let outcome = if permission.is_granted() {
                            self.deliver(&event)
                        } else {
                            debug!(
                                task = %event.task_id,
                                permission = permission.label(),
                                "Alert suppressed"
                            );
                            AlertOutcome::NotPermitted
                        };
                        FiredAlert { event, outcome }
                    })
                    .collect()
            }
            NotifiedPolicy::Delivered => {
                if !permission.is_granted() {
                    return Vec::new();
                }

                let due = self.store.lock().await.due_alerts(now);
                if due.is_empty() {
                    return Vec::new();
                }

                let shown: Vec<AlertEvent> = due
                    .into_iter()
                    .filter(|e| self.deliver(e) == AlertOutcome::Shown)
                    .collect();

                // A task deleted between delivery and marking is simply dropped
                let mut store = self.store.lock().await;
                shown
                    .into_iter()
                    .filter(|e| store.mark_notified(&e.task_id))
                    .map(|event| FiredAlert {
                        event,
                        outcome: AlertOutcome::Shown,
                    })
                    .collect()
            }
        }
    }

    fn deliver(&self, event: &AlertEvent) -> AlertOutcome {
        match self.notifier.notify_event(event) {
            Ok(()) => {
                info!(task = %event.task_id, "Deadline alert shown");
                AlertOutcome::Shown
            }
            Err(e) => {
                warn!(task = %event.task_id, error = %e, "Failed to show deadline alert");
                AlertOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Background task running [`DeadlineScanner::scan`] on an interval.
///
/// The first scan runs one period after spawning. Periods below
/// [`MIN_SCAN_INTERVAL`] are raised to it. Dropping the watcher aborts the task.
pub struct DeadlineWatcher {
    handle: Option<JoinHandle<()>>,
}

impl DeadlineWatcher {
    pub fn spawn(
        scanner: DeadlineScanner,
        period: Duration,
        alerts_tx: mpsc::UnboundedSender<FiredAlert>,
    ) -> Self {
        let period = period.max(MIN_SCAN_INTERVAL);
        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                for alert in scanner.scan(Utc::now()).await {
                    // Nobody listening is fine; the notifier already ran
                    let _ = alerts_tx.send(alert);
                }
            }
        });

        debug!(period_ms = period.as_millis() as u64, "Deadline watcher started");
        Self {
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Abort the task and wait until it has exited
    pub async fn stop(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
            debug!("Deadline watcher stopped");
        }
    }
}

impl Drop for DeadlineWatcher {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
