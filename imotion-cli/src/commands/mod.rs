//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod generate;
mod history;
mod status;

pub use generate::GenerateArgs;
pub use history::HistoryCommands;

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use imotion_core::domain::job::JobStatus;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a video from an image and a prompt
    Generate(GenerateArgs),
    /// Browse previous generations
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Check the status of a job once
    Status {
        /// Job ID returned by the service
        job_id: String,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Generate(args) => generate::handle_generate(args, config).await,
        Commands::History { command } => history::handle_history_command(command, config),
        Commands::Status { job_id, json } => status::handle_status(&job_id, json, config).await,
    }
}

/// Colorize job status for display
fn colorize_status(status: JobStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Pending => status_str.yellow(),
        JobStatus::Processing => status_str.cyan(),
        JobStatus::Completed => status_str.green(),
        JobStatus::Failed => status_str.red(),
    }
}
