//! todo - Interactive to-do list with deadline alerts

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use todo_alert::cli::{self, Cli, Commands};
use todo_alert::session::{Config, Session};

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var("TODO_ALERT_DEBUG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter("todo_alert=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();

    if let Some(Commands::Completion { shell }) = cli.command {
        generate(shell, &mut Cli::command(), "todo", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load()?;
    cli.apply_overrides(&mut config);

    let session = Session::from_config(&config);
    cli::shell::run(session).await
}
