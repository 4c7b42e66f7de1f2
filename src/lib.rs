//! todo-alert library - Priority-sorted task list with one-shot deadline alerts

pub mod alert;
pub mod cli;
pub mod session;
pub mod task;
