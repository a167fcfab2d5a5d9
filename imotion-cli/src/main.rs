//! iMotion CLI
//!
//! Command-line front end for image-to-video generation: submits requests,
//! follows their progress and browses the local generation history.

mod commands;
mod config;
mod id_resolver;
mod image;
mod types;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "imotion")]
#[command(about = "Image-to-video generation CLI", long_about = None)]
struct Cli {
    /// Generation API base URL
    #[arg(
        long,
        global = true,
        env = "IMOTION_API_BASE_URL",
        default_value = imotion_client::DEFAULT_BASE_URL
    )]
    api_base_url: String,

    /// API keys, used in rotation (comma-separated)
    #[arg(
        long = "api-key",
        global = true,
        env = "IMOTION_API_KEYS",
        value_delimiter = ',',
        hide_env_values = true
    )]
    api_keys: Vec<String>,

    /// Directory holding the generation history
    #[arg(long, global = true, env = "IMOTION_DATA_DIR", default_value = ".imotion")]
    data_dir: PathBuf,

    /// Delay between status checks, in milliseconds
    #[arg(long, global = true, env = "IMOTION_POLL_INTERVAL_MS", default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Status checks before a job is reported as timed out
    #[arg(long, global = true, env = "IMOTION_MAX_POLL_ATTEMPTS", default_value_t = 100)]
    max_poll_attempts: u32,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imotion=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        api_base_url: cli.api_base_url,
        api_keys: cli.api_keys,
        data_dir: cli.data_dir,
        poll_interval_ms: cli.poll_interval_ms,
        max_poll_attempts: cli.max_poll_attempts,
    };

    handle_command(cli.command, &config).await
}
