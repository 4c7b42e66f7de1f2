use thiserror::Error;

use super::model::TaskId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("Task not found: {0}")]
    InvalidReference(TaskId),

    #[error("Task text cannot be blank")]
    BlankText,

    #[error("Invalid priority: {0}. Use: high, medium, low")]
    InvalidPriority(String),

    #[error(
        "Invalid deadline: {0}.\n\
         Use YYYY-MM-DDTHH:MM (local time), RFC 3339, or a relative offset like +10m"
    )]
    InvalidDeadline(String),

    #[error("Invalid task ID: {0}. Use the form T001")]
    InvalidTaskId(String),
}

pub type Result<T> = std::result::Result<T, TaskError>;
