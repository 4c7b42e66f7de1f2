//! Interactive shell
//!
//! Each input line is parsed as a clap multicall command. Alerts fired by the
//! deadline watcher are printed between prompts.

use std::io::{IsTerminal, Write};

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use super::render::Renderer;
use crate::alert::Permission;
use crate::session::Session;
use crate::task::{parse_deadline, TaskError, TaskId, TaskPriority};

#[derive(Parser, Debug)]
#[command(multicall = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ShellCommand {
    /// Add a task
    Add {
        /// Task text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Priority (high, medium, low)
        #[arg(short, long, default_value = "medium")]
        priority: TaskPriority,

        /// Deadline: YYYY-MM-DDTHH:MM (local), RFC 3339, or +10m / +2h / +1d
        #[arg(short, long)]
        deadline: Option<String>,
    },

    /// Edit a task; omitted fields keep their current value
    Edit {
        /// Task ID (e.g., T001)
        id: TaskId,

        /// New text
        #[arg(short, long, num_args = 1..)]
        text: Option<Vec<String>>,

        /// New priority
        #[arg(short, long)]
        priority: Option<TaskPriority>,

        /// New deadline
        #[arg(short, long, conflicts_with = "no_deadline")]
        deadline: Option<String>,

        /// Remove the deadline
        #[arg(long)]
        no_deadline: bool,
    },

    /// Mark a task done, or not done again
    #[command(visible_alias = "done")]
    Toggle {
        /// Task ID (e.g., T001)
        id: TaskId,
    },

    /// Delete a task
    #[command(visible_alias = "rm")]
    Delete {
        /// Task ID (e.g., T001)
        id: TaskId,
    },

    /// Remove all tasks
    Clear,

    /// Show the task list
    #[command(visible_alias = "ls")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Switch between light and dark mode
    Theme,

    /// Enable deadline notifications
    Notify,

    /// Leave the session
    #[command(visible_alias = "exit")]
    Quit,
}

impl ShellLine {
    /// Parse a line of input. `Ok(None)` for a blank line.
    pub fn parse_line(line: &str) -> Result<Option<Self>, clap::Error> {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Ok(None);
        }
        Self::try_parse_from(words).map(Some)
    }
}

/// What the shell should print after a command
#[derive(Debug, PartialEq)]
pub enum Reply {
    Tasks,
    Message(String),
    Json(String),
    Nothing,
    Quit,
}

pub async fn execute(
    session: &mut Session,
    command: ShellCommand,
    now: DateTime<Utc>,
) -> Result<Reply> {
    match command {
        ShellCommand::Add {
            text,
            priority,
            deadline,
        } => {
            let deadline = deadline
                .map(|d| parse_deadline(&d, now))
                .transpose()?;
            match session.add(&text.join(" "), priority, deadline).await {
                Some(id) => {
                    debug!(task = %id, "Added from shell");
                    Ok(Reply::Tasks)
                }
                None => Ok(Reply::Nothing),
            }
        }
        ShellCommand::Edit {
            id,
            text,
            priority,
            deadline,
            no_deadline,
        } => {
            let current = session
                .get(&id)
                .await
                .ok_or_else(|| TaskError::InvalidReference(id.clone()))?;

            let text = text.map_or(current.text, |words| words.join(" "));
            let priority = priority.unwrap_or(current.priority);
            let deadline = if no_deadline {
                None
            } else {
                match deadline {
                    Some(d) => Some(parse_deadline(&d, now)?),
                    None => current.deadline,
                }
            };

            session.edit(&id, &text, priority, deadline).await?;
            Ok(Reply::Tasks)
        }
        ShellCommand::Toggle { id } => {
            session.toggle_completed(&id).await?;
            Ok(Reply::Tasks)
        }
        ShellCommand::Delete { id } => {
            session.delete(&id).await?;
            Ok(Reply::Tasks)
        }
        ShellCommand::Clear => {
            session.clear().await;
            Ok(Reply::Tasks)
        }
        ShellCommand::List { json } => {
            if json {
                let tasks = session.tasks().await;
                Ok(Reply::Json(serde_json::to_string_pretty(&tasks)?))
            } else {
                Ok(Reply::Tasks)
            }
        }
        ShellCommand::Theme => {
            let mode = session.toggle_display_mode();
            Ok(Reply::Message(format!("Switched to {} mode", mode.label())))
        }
        ShellCommand::Notify => {
            let message = match session.request_permission().await {
                Permission::Granted => "Notifications enabled.".to_string(),
                other => format!("Notification permission {}.", other.label()),
            };
            Ok(Reply::Message(message))
        }
        ShellCommand::Quit => Ok(Reply::Quit),
    }
}

fn prompt() {
    print!("todo> ");
    let _ = std::io::stdout().flush();
}

/// Run the interactive shell until `quit`, EOF or Ctrl-C, then end the session
pub async fn run(mut session: Session) -> Result<()> {
    let styled = std::io::stdout().is_terminal();
    let mut renderer = Renderer::new(session.display_mode(), styled);
    let mut alerts = session.take_alerts();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("todo v{} - type `help` for commands", env!("CARGO_PKG_VERSION"));
    println!("{}", renderer.task_list(&session.tasks().await, Utc::now()));
    prompt();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    println!();
                    break;
                };

                let command = match ShellLine::parse_line(&line) {
                    Ok(Some(parsed)) => parsed.command,
                    Ok(None) => {
                        prompt();
                        continue;
                    }
                    Err(e) => {
                        let _ = e.print();
                        prompt();
                        continue;
                    }
                };

                match execute(&mut session, command, Utc::now()).await {
                    Ok(Reply::Quit) => break,
                    Ok(Reply::Tasks) => {
                        println!("{}", renderer.task_list(&session.tasks().await, Utc::now()));
                    }
                    Ok(Reply::Message(message)) => {
                        renderer.set_mode(session.display_mode());
                        println!("{}", message);
                    }
                    Ok(Reply::Json(json)) => println!("{}", json),
                    Ok(Reply::Nothing) => {}
                    Err(e) => eprintln!("Error: {}", e),
                }
                prompt();
            }
            Some(alert) = async {
                match alerts.as_mut() {
                    Some(rx) => rx.recv().await,
                    None => std::future::pending().await,
                }
            } => {
                println!();
                println!("{}", renderer.alert_line(&alert));
                prompt();
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    session.shutdown().await;
    Ok(())
}
