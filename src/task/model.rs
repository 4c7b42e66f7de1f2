//! Task data model

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::TaskError;

/// Task ID in format T001, T002, etc.
///
/// Assigned by the store at creation and never reused, so a reference held by
/// the caller can go stale but can never point at a different task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    /// Create a new task ID from number
    pub fn from_number(n: u32) -> Self {
        Self(format!("T{:03}", n))
    }

    /// Parse task ID from user input: `T001`, `t7` or a bare `7`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let digits = s
            .strip_prefix('T')
            .or_else(|| s.strip_prefix('t'))
            .unwrap_or(s);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        digits.parse::<u32>().ok().map(Self::from_number)
    }

    /// Get the numeric part
    pub fn number(&self) -> Option<u32> {
        self.0.get(1..)?.parse().ok()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| TaskError::InvalidTaskId(s.to_string()))
    }
}

/// Task priority
///
/// Declared in sort order, so the derived `Ord` agrees with [`TaskPriority::rank`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [Self::High, Self::Medium, Self::Low];

    /// Ordinal used for sorting: High=1, Medium=2, Low=3
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }

    /// Get the label
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskPriority {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" | "h" => Ok(Self::High),
            "medium" | "med" | "m" => Ok(Self::Medium),
            "low" | "l" => Ok(Self::Low),
            _ => Err(TaskError::InvalidPriority(s.to_string())),
        }
    }
}

/// A task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task ID
    pub id: TaskId,

    /// Display text, never blank
    pub text: String,

    /// Priority level
    #[serde(default)]
    pub priority: TaskPriority,

    /// Point in time after which the task is due for alerting
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,

    #[serde(default)]
    pub completed: bool,

    /// Set once the deadline alert has fired; never reset
    #[serde(default)]
    pub notified: bool,

    /// Set when an edit has been saved
    #[serde(default)]
    pub updated: bool,
}

impl Task {
    /// Create a new task
    pub fn new(
        id: TaskId,
        text: impl Into<String>,
        priority: TaskPriority,
        deadline: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            priority,
            deadline,
            completed: false,
            notified: false,
            updated: false,
        }
    }

    /// Whether the deadline scan should alert for this task at `now`
    pub fn is_alert_due(&self, now: DateTime<Utc>) -> bool {
        !self.completed && !self.notified && self.deadline.is_some_and(|d| d <= now)
    }

    /// Check if the deadline has passed, regardless of alert state
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.deadline.is_some_and(|d| d <= now)
    }
}

/// Parse a deadline typed by the user.
///
/// Accepts RFC 3339, local `YYYY-MM-DDTHH:MM[:SS]` / `YYYY-MM-DD HH:MM[:SS]`,
/// or a relative offset from `now` such as `+90s`, `+10m`, `+2h`, `+1d`.
pub fn parse_deadline(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, TaskError> {
    let s = input.trim();
    let invalid = || TaskError::InvalidDeadline(input.to_string());

    if let Some(offset) = s.strip_prefix('+') {
        return parse_offset(offset)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(invalid);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    const LOCAL_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
    ];
    let naive = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(invalid)?;

    // Nonexistent or ambiguous local times (DST transitions) are rejected
    Local
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(invalid)
}

fn parse_offset(s: &str) -> Option<Duration> {
    let unit_at = s.find(|c: char| !c.is_ascii_digit())?;
    let (amount, unit) = s.split_at(unit_at);
    let amount: i64 = amount.parse().ok()?;
    match unit {
        "s" => Duration::try_seconds(amount),
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        _ => None,
    }
}

/// Format a deadline in local time for display
pub fn format_deadline(deadline: &DateTime<Utc>) -> String {
    deadline
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}
