//! CLI definition, terminal rendering and the interactive shell

pub mod definition;
pub mod render;
pub mod shell;

pub use definition::{Cli, Commands};
