//! In-memory task store
//!
//! Every mutating operation leaves the list sorted by priority rank with
//! insertion order preserved among equal priorities.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::error::{Result, TaskError};
use super::model::{Task, TaskId, TaskPriority};

/// A deadline alert produced by a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertEvent {
    pub task_id: TaskId,
    pub text: String,
    pub deadline: DateTime<Utc>,
}

/// Sort tasks in place by priority rank. Stable, so ties keep their order.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| t.priority.rank());
}

/// Owned variant of [`sort_tasks`]
pub fn sorted(mut tasks: Vec<Task>) -> Vec<Task> {
    sort_tasks(&mut tasks);
    tasks
}

#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    last_id: u32,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tasks in display order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Add a task. Blank text is ignored and returns `None`.
    pub fn add(
        &mut self,
        text: &str,
        priority: TaskPriority,
        deadline: Option<DateTime<Utc>>,
    ) -> Option<TaskId> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring add with blank text");
            return None;
        }

        self.last_id += 1;
        let id = TaskId::from_number(self.last_id);
        self.tasks
            .push(Task::new(id.clone(), text, priority, deadline));
        sort_tasks(&mut self.tasks);

        debug!(task = %id, %priority, ?deadline, "Added task");
        Some(id)
    }

    /// Replace text, priority and deadline. Completion and alert state are kept.
    pub fn edit(
        &mut self,
        id: &TaskId,
        text: &str,
        priority: TaskPriority,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<&[Task]> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TaskError::BlankText);
        }

        let task = self.find_mut(id)?;
        task.text = text.to_string();
        task.priority = priority;
        task.deadline = deadline;
        task.updated = true;
        sort_tasks(&mut self.tasks);

        debug!(task = %id, %priority, ?deadline, "Edited task");
        Ok(&self.tasks)
    }

    pub fn toggle_completed(&mut self, id: &TaskId) -> Result<&[Task]> {
        let task = self.find_mut(id)?;
        task.completed = !task.completed;
        let completed = task.completed;
        sort_tasks(&mut self.tasks);

        debug!(task = %id, completed, "Toggled task");
        Ok(&self.tasks)
    }

    pub fn delete(&mut self, id: &TaskId) -> Result<&[Task]> {
        let index = self
            .tasks
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| TaskError::InvalidReference(id.clone()))?;
        self.tasks.remove(index);

        debug!(task = %id, "Deleted task");
        Ok(&self.tasks)
    }

    pub fn clear(&mut self) -> &[Task] {
        let removed = self.tasks.len();
        self.tasks.clear();

        debug!(removed, "Cleared tasks");
        &self.tasks
    }

    /// Alerts that a scan at `now` would emit, without marking anything
    pub fn due_alerts(&self, now: DateTime<Utc>) -> Vec<AlertEvent> {
        self.tasks
            .iter()
            .filter(|t| t.is_alert_due(now))
            .filter_map(|t| {
                Some(AlertEvent {
                    task_id: t.id.clone(),
                    text: t.text.clone(),
                    deadline: t.deadline?,
                })
            })
            .collect()
    }

    /// Mark a single task as notified. Returns false if the task is gone.
    pub fn mark_notified(&mut self, id: &TaskId) -> bool {
        match self.tasks.iter_mut().find(|t| &t.id == id) {
            Some(task) => {
                task.notified = true;
                true
            }
            None => false,
        }
    }

    /// Emit one alert per due task and mark each of them notified.
    ///
    /// Order is left untouched: `notified` does not take part in sorting.
    pub fn scan_deadlines(&mut self, now: DateTime<Utc>) -> Vec<AlertEvent> {
        let events = self.due_alerts(now);
        for event in &events {
            self.mark_notified(&event.task_id);
            debug!(task = %event.task_id, deadline = %event.deadline, "Deadline reached");
        }
        events
    }

    fn find_mut(&mut self, id: &TaskId) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| TaskError::InvalidReference(id.clone()))
    }
}
