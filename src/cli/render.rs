//! Terminal rendering of the task list

use chrono::{DateTime, Utc};
use crossterm::style::{Attribute, Color, ContentStyle};

use crate::session::{AlertOutcome, DisplayMode, FiredAlert};
use crate::task::{format_deadline, Task, TaskPriority};

#[derive(Debug, Clone)]
pub struct Palette {
    pub text: Color,
    pub dimmed: Color,
    pub high: Color,
    pub medium: Color,
    pub low: Color,
    pub deadline: Color,
    pub overdue: Color,
    pub highlight: Color,
}

impl Palette {
    pub fn light() -> Self {
        Self {
            text: Color::Rgb { r: 30, g: 30, b: 40 },
            dimmed: Color::Rgb { r: 140, g: 140, b: 150 },
            high: Color::Rgb { r: 200, g: 40, b: 40 },
            medium: Color::Rgb { r: 190, g: 120, b: 0 },
            low: Color::Rgb { r: 30, g: 140, b: 60 },
            deadline: Color::Rgb { r: 60, g: 90, b: 170 },
            overdue: Color::Rgb { r: 210, g: 15, b: 57 },
            highlight: Color::Rgb { r: 255, g: 243, b: 176 },
        }
    }

    pub fn dark() -> Self {
        Self {
            text: Color::Rgb { r: 220, g: 220, b: 230 },
            dimmed: Color::Rgb { r: 110, g: 110, b: 125 },
            high: Color::Rgb { r: 255, g: 100, b: 80 },
            medium: Color::Rgb { r: 255, g: 180, b: 60 },
            low: Color::Rgb { r: 100, g: 220, b: 160 },
            deadline: Color::Rgb { r: 130, g: 170, b: 255 },
            overdue: Color::Rgb { r: 255, g: 80, b: 120 },
            highlight: Color::Rgb { r: 60, g: 60, b: 30 },
        }
    }

    pub fn for_mode(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::Light => Self::light(),
            DisplayMode::Dark => Self::dark(),
        }
    }

    fn priority(&self, priority: TaskPriority) -> Color {
        match priority {
            TaskPriority::High => self.high,
            TaskPriority::Medium => self.medium,
            TaskPriority::Low => self.low,
        }
    }
}

/// Renders tasks as text lines, with or without ANSI styling
pub struct Renderer {
    palette: Palette,
    styled: bool,
}

impl Renderer {
    pub fn new(mode: DisplayMode, styled: bool) -> Self {
        Self {
            palette: Palette::for_mode(mode),
            styled,
        }
    }

    pub fn plain() -> Self {
        Self::new(DisplayMode::default(), false)
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.palette = Palette::for_mode(mode);
    }

    fn paint(&self, text: &str, style: ContentStyle) -> String {
        if self.styled {
            style.apply(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn fg(color: Color) -> ContentStyle {
        ContentStyle {
            foreground_color: Some(color),
            ..ContentStyle::default()
        }
    }

    /// `T001 [ ] Buy milk - Low | Deadline: 2026-02-15 18:00`
    pub fn task_line(&self, task: &Task, now: DateTime<Utc>) -> String {
        let checkbox = if task.completed { "[x]" } else { "[ ]" };

        let mut text_style = Self::fg(if task.completed {
            self.palette.dimmed
        } else {
            self.palette.text
        });
        if task.completed {
            text_style.attributes.set(Attribute::CrossedOut);
        }
        if task.updated {
            text_style.background_color = Some(self.palette.highlight);
        }

        let mut priority_style = Self::fg(self.palette.priority(task.priority));
        priority_style.attributes.set(Attribute::Bold);

        let mut line = format!(
            "{} {} {} - {}",
            self.paint(&task.id.to_string(), Self::fg(self.palette.dimmed)),
            checkbox,
            self.paint(&task.text, text_style),
            self.paint(task.priority.label(), priority_style),
        );

        if let Some(deadline) = &task.deadline {
            let color = if task.is_overdue(now) {
                self.palette.overdue
            } else {
                self.palette.deadline
            };
            let label = format!("Deadline: {}", format_deadline(deadline));
            line.push_str(" | ");
            line.push_str(&self.paint(&label, Self::fg(color)));
        }

        if task.updated {
            line.push_str(" (edited)");
        }

        line
    }

    pub fn task_list(&self, tasks: &[Task], now: DateTime<Utc>) -> String {
        if tasks.is_empty() {
            return "No tasks. Add one with: add <text> [-p high|medium|low] [-d deadline]"
                .to_string();
        }

        let done = tasks.iter().filter(|t| t.completed).count();
        let mut out = format!("Tasks ({}, {} done):\n", tasks.len(), done);
        for task in tasks {
            out.push_str("  ");
            out.push_str(&self.task_line(task, now));
            out.push('\n');
        }
        out.push_str("  (clear: remove all)");
        out
    }

    pub fn alert_line(&self, alert: &FiredAlert) -> String {
        let head = format!(
            "⏰ {} \"{}\" reached its deadline ({})",
            alert.event.task_id,
            alert.event.text,
            format_deadline(&alert.event.deadline)
        );
        let mut style = Self::fg(self.palette.overdue);
        style.attributes.set(Attribute::Bold);
        let mut line = self.paint(&head, style);
        match &alert.outcome {
            AlertOutcome::Shown => {}
            AlertOutcome::NotPermitted => {
                line.push_str(" [alert not shown: notifications not enabled, run `notify`]");
            }
            AlertOutcome::Failed(reason) => {
                line.push_str(&format!(" [alert not shown: {}]", reason));
            }
        }
        line
    }
}
