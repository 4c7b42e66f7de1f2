//! Command-line definition for the `todo` binary

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::alert::{AlertBackend, NotifiedPolicy};
use crate::session::{Config, DisplayMode};

#[derive(Parser)]
#[command(
    name = "todo",
    version,
    about = "Priority-sorted to-do list with one-shot deadline alerts",
    long_about = "Interactive to-do list. Tasks are kept sorted by priority \
                  (high, medium, low) and alert once when their deadline passes.\n\n\
                  Tasks live in memory for the length of the session."
)]
pub struct Cli {
    /// Display mode (light, dark)
    #[arg(long, value_name = "MODE")]
    pub theme: Option<DisplayMode>,

    /// When a task counts as notified (attempted, delivered)
    #[arg(long)]
    pub policy: Option<NotifiedPolicy>,

    /// Alert backend (desktop, terminal)
    #[arg(long)]
    pub backend: Option<AlertBackend>,

    /// How often to scan for passed deadlines, in milliseconds
    #[arg(long, value_name = "MS")]
    pub scan_interval_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Command-line flags take precedence over the config file
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(mode) = self.theme {
            config.display.mode = mode;
        }
        if let Some(policy) = self.policy {
            config.alerts.notified_policy = policy;
        }
        if let Some(backend) = self.backend {
            config.alerts.backend = backend;
        }
        if let Some(ms) = self.scan_interval_ms {
            config.alerts.scan_interval_ms = ms;
        }
    }
}
