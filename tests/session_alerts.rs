//! Integration tests for deadline alerts through a running session

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use todo_alert::alert::{AlertError, NotifiedPolicy, Notifier, Permission, PermissionState};
use todo_alert::session::{AlertOutcome, DisplayMode, Session, SessionOptions};
use todo_alert::task::{TaskError, TaskId, TaskPriority};

/// Notifier that records every alert instead of showing it
struct RecordingNotifier {
    permission: PermissionState,
    grant_on_request: bool,
    fail: bool,
    shown: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    fn new(initial: Permission, grant_on_request: bool) -> Arc<Self> {
        let permission = PermissionState::default();
        permission.set(initial);
        Arc::new(Self {
            permission,
            grant_on_request,
            fail: false,
            shown: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        let permission = PermissionState::default();
        permission.set(Permission::Granted);
        Arc::new(Self {
            permission,
            grant_on_request: true,
            fail: true,
            shown: Mutex::new(Vec::new()),
        })
    }

    fn shown(&self) -> Vec<(String, String)> {
        self.shown.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn request_permission(&self) -> Permission {
        let p = if self.grant_on_request {
            Permission::Granted
        } else {
            Permission::Denied
        };
        self.permission.set(p);
        p
    }

    fn permission(&self) -> Permission {
        self.permission.get()
    }

    fn notify(&self, title: &str, body: &str) -> Result<(), AlertError> {
        if self.fail {
            return Err(AlertError::CommandFailed("no display".to_string()));
        }
        self.shown
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

/// Options with an interval long enough that only explicit scans run
fn quiet_options(policy: NotifiedPolicy) -> SessionOptions {
    SessionOptions {
        scan_interval: Duration::from_secs(3600),
        policy,
        display_mode: DisplayMode::Light,
    }
}

fn at(h: u32, m: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 15, h, m, 0).unwrap()
}

#[tokio::test]
async fn test_alert_fires_once_when_granted() {
    let notifier = RecordingNotifier::new(Permission::Granted, true);
    let session = Session::start(quiet_options(NotifiedPolicy::Attempted), notifier.clone());

    let id = session
        .add("Submit report", TaskPriority::High, Some(at(12, 0)))
        .await
        .unwrap();

    assert!(session.scan_now(at(11, 59)).await.is_empty());

    let fired = session.scan_now(at(12, 0)).await;
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].event.task_id, id);
    assert!(fired[0].delivered());
    assert_eq!(
        notifier.shown(),
        vec![(
            "Task Deadline".to_string(),
            "Deadline approaching: Submit report".to_string()
        )]
    );

    assert!(session.scan_now(at(12, 5)).await.is_empty());
    assert_eq!(notifier.shown().len(), 1);
    assert!(session.get(&id).await.unwrap().notified);

    session.shutdown().await;
}

#[tokio::test]
async fn test_attempted_policy_marks_without_permission() {
    let notifier = RecordingNotifier::new(Permission::Default, true);
    let session = Session::start(quiet_options(NotifiedPolicy::Attempted), notifier.clone());

    let id = session
        .add("Pay rent", TaskPriority::Medium, Some(at(9, 0)))
        .await
        .unwrap();

    let fired = session.scan_now(at(9, 30)).await;
    assert_eq!(fired.len(), 1);
    assert!(!fired[0].delivered());
    assert!(notifier.shown().is_empty());
    assert!(session.get(&id).await.unwrap().notified);

    // Granting later does not replay the missed alert
    assert_eq!(session.request_permission().await, Permission::Granted);
    assert!(session.scan_now(at(9, 31)).await.is_empty());
    assert!(notifier.shown().is_empty());

    session.shutdown().await;
}

#[tokio::test]
async fn test_delivered_policy_waits_for_permission() {
    let notifier = RecordingNotifier::new(Permission::Default, true);
    let session = Session::start(quiet_options(NotifiedPolicy::Delivered), notifier.clone());

    let id = session
        .add("Pay rent", TaskPriority::Medium, Some(at(9, 0)))
        .await
        .unwrap();

    assert!(session.scan_now(at(9, 30)).await.is_empty());
    assert!(!session.get(&id).await.unwrap().notified);

    session.request_permission().await;
    let fired = session.scan_now(at(9, 31)).await;
    assert_eq!(fired.len(), 1);
    assert!(fired[0].delivered());
    assert_eq!(notifier.shown().len(), 1);
    assert!(session.get(&id).await.unwrap().notified);

    assert!(session.scan_now(at(9, 32)).await.is_empty());

    session.shutdown().await;
}

#[tokio::test]
async fn test_delivered_policy_retries_failed_delivery() {
    let notifier = RecordingNotifier::failing();
    let session = Session::start(quiet_options(NotifiedPolicy::Delivered), notifier);

    let id = session
        .add("Call bank", TaskPriority::Low, Some(at(8, 0)))
        .await
        .unwrap();

    assert!(session.scan_now(at(8, 1)).await.is_empty());
    assert!(!session.get(&id).await.unwrap().notified);

    session.shutdown().await;
}

#[tokio::test]
async fn test_denied_permission_is_reported() {
    let notifier = RecordingNotifier::new(Permission::Default, false);
    let session = Session::start(quiet_options(NotifiedPolicy::Attempted), notifier);

    assert_eq!(session.request_permission().await, Permission::Denied);
    assert_eq!(session.permission(), Permission::Denied);

    session.shutdown().await;
}

#[tokio::test]
async fn test_completed_and_undated_tasks_never_alert() {
    let notifier = RecordingNotifier::new(Permission::Granted, true);
    let session = Session::start(quiet_options(NotifiedPolicy::Attempted), notifier.clone());

    let done = session
        .add("Old chore", TaskPriority::High, Some(at(7, 0)))
        .await
        .unwrap();
    session.toggle_completed(&done).await.unwrap();
    session.add("Someday", TaskPriority::Low, None).await.unwrap();

    assert!(session.scan_now(at(23, 0)).await.is_empty());
    assert!(notifier.shown().is_empty());

    session.shutdown().await;
}

#[tokio::test]
async fn test_edit_keeps_notified_state() {
    let notifier = RecordingNotifier::new(Permission::Granted, true);
    let session = Session::start(quiet_options(NotifiedPolicy::Attempted), notifier.clone());

    let id = session
        .add("Renew passport", TaskPriority::Low, Some(at(10, 0)))
        .await
        .unwrap();
    assert_eq!(session.scan_now(at(10, 0)).await.len(), 1);

    // Moving the deadline into the future and back does not re-arm the alert
    session
        .edit(&id, "Renew passport", TaskPriority::High, Some(at(22, 0)))
        .await
        .unwrap();
    assert!(session.scan_now(at(23, 0)).await.is_empty());
    assert_eq!(notifier.shown().len(), 1);

    session.shutdown().await;
}

#[tokio::test]
async fn test_unknown_id_is_an_error() {
    let notifier = RecordingNotifier::new(Permission::Granted, true);
    let session = Session::start(quiet_options(NotifiedPolicy::Attempted), notifier);

    let missing = TaskId::from_number(42);
    assert_eq!(
        session.toggle_completed(&missing).await,
        Err(TaskError::InvalidReference(missing.clone()))
    );
    assert_eq!(
        session.delete(&missing).await,
        Err(TaskError::InvalidReference(missing))
    );

    session.shutdown().await;
}

#[tokio::test]
async fn test_watcher_fires_on_its_own() {
    let notifier = RecordingNotifier::new(Permission::Granted, true);
    let mut session = Session::start(
        SessionOptions {
            scan_interval: Duration::from_millis(20),
            policy: NotifiedPolicy::Attempted,
            display_mode: DisplayMode::Light,
        },
        notifier.clone(),
    );
    let mut alerts = session.take_alerts().unwrap();
    assert!(session.take_alerts().is_none());
    assert!(session.is_watching());

    let id = session
        .add("Stand up", TaskPriority::High, Some(Utc::now()))
        .await
        .unwrap();

    let alert = tokio::time::timeout(Duration::from_secs(5), alerts.recv())
        .await
        .expect("watcher should fire within the timeout")
        .unwrap();
    assert_eq!(alert.event.task_id, id);
    assert!(alert.delivered());

    // No second alert for the same task
    let again = tokio::time::timeout(Duration::from_millis(100), alerts.recv()).await;
    assert!(again.is_err());
    assert_eq!(notifier.shown().len(), 1);

    session.shutdown().await;

    // Sender is dropped with the watcher task
    assert!(alerts.recv().await.is_none());
}

#[tokio::test]
async fn test_session_priority_order_after_mutations() {
    let notifier = RecordingNotifier::new(Permission::Granted, true);
    let session = Session::start(quiet_options(NotifiedPolicy::Attempted), notifier);

    let low = session.add("Water plants", TaskPriority::Low, None).await.unwrap();
    let high = session.add("Fix leak", TaskPriority::High, None).await.unwrap();
    let medium = session.add("Buy milk", TaskPriority::Medium, None).await.unwrap();

    let order: Vec<TaskId> = session.tasks().await.into_iter().map(|t| t.id).collect();
    assert_eq!(order, vec![high.clone(), medium.clone(), low.clone()]);

    let tasks = session
        .edit(&low, "Water plants", TaskPriority::High, None)
        .await
        .unwrap();
    let order: Vec<TaskId> = tasks.into_iter().map(|t| t.id).collect();
    assert_eq!(order, vec![high, low, medium]);

    assert!(session.clear().await.is_empty());
    assert!(session.tasks().await.is_empty());

    session.shutdown().await;
}

#[tokio::test]
async fn test_attempted_policy_reports_failed_delivery() {
    let notifier = RecordingNotifier::failing();
    let session = Session::start(quiet_options(NotifiedPolicy::Attempted), notifier);

    let id = session
        .add("Call bank", TaskPriority::Low, Some(at(8, 0)))
        .await
        .unwrap();

    let fired = session.scan_now(at(8, 1)).await;
    assert_eq!(fired.len(), 1);
    assert_eq!(
        fired[0].outcome,
        AlertOutcome::Failed("Alert command failed: no display".to_string())
    );
    assert!(!fired[0].delivered());
    assert!(session.get(&id).await.unwrap().notified);

    session.shutdown().await;
}

#[tokio::test]
async fn test_zero_interval_keeps_watcher_alive() {
    let notifier = RecordingNotifier::new(Permission::Granted, true);
    let mut session = Session::start(
        SessionOptions {
            scan_interval: Duration::ZERO,
            policy: NotifiedPolicy::Attempted,
            display_mode: DisplayMode::Light,
        },
        notifier,
    );
    let mut alerts = session.take_alerts().unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(session.is_watching());

    let id = session
        .add("Stretch", TaskPriority::Medium, Some(Utc::now()))
        .await
        .unwrap();
    let alert = tokio::time::timeout(Duration::from_secs(5), alerts.recv())
        .await
        .expect("watcher should fire within the timeout")
        .unwrap();
    assert_eq!(alert.event.task_id, id);

    session.shutdown().await;
}

#[tokio::test]
async fn test_watcher_waits_one_period_before_first_scan() {
    let notifier = RecordingNotifier::new(Permission::Granted, true);
    let session = Session::start(quiet_options(NotifiedPolicy::Attempted), notifier.clone());

    let id = session
        .add("Already late", TaskPriority::High, Some(at(6, 0)))
        .await
        .unwrap();

    // Give the watcher task every chance to run
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!session.get(&id).await.unwrap().notified);
    assert!(notifier.shown().is_empty());

    session.shutdown().await;
}

#[tokio::test]
async fn test_dropping_session_stops_watcher() {
    let notifier = RecordingNotifier::new(Permission::Granted, true);
    let mut session = Session::start(
        SessionOptions {
            scan_interval: Duration::from_millis(20),
            policy: NotifiedPolicy::Attempted,
            display_mode: DisplayMode::Light,
        },
        notifier.clone(),
    );
    let mut alerts = session.take_alerts().unwrap();
    assert!(session.is_watching());

    drop(session);

    // The aborted task drops its sender, closing the channel
    let closed = tokio::time::timeout(Duration::from_secs(5), alerts.recv())
        .await
        .expect("channel should close after the session is dropped");
    assert!(closed.is_none());
    assert!(notifier.shown().is_empty());
}
