//! Task management module
//!
//! This module provides the in-memory task list:
//! - Task model with priority and optional deadline
//! - Priority-sorted store (add, edit, toggle, delete, clear)
//! - Deadline scan that alerts at most once per task

pub mod error;
pub mod model;
pub mod store;

pub use error::TaskError;
pub use model::{format_deadline, parse_deadline, Task, TaskId, TaskPriority};
pub use store::{sort_tasks, sorted, AlertEvent, TaskStore};
