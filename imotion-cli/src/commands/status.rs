//! Status command handler

use anyhow::{Context, Result};
use colored::*;
use imotion_core::domain::job::JobHandle;

use super::colorize_status;
use crate::config::Config;

/// Fetch and print the current status of a job
pub async fn handle_status(job_id: &str, json: bool, config: &Config) -> Result<()> {
    let job_id = job_id.trim();
    if job_id.is_empty() {
        anyhow::bail!("Job ID cannot be empty");
    }

    let client = config.client()?;
    let handle = JobHandle::new(job_id);
    let result = client
        .fetch_status(&handle)
        .await
        .with_context(|| format!("Failed to fetch status of job {}", handle))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", "Job Status:".bold());
    println!("  ID:      {}", result.id.to_string().cyan());
    println!("  Status:  {}", colorize_status(result.status));
    for output in &result.outputs {
        println!("  Output:  {}", output.cyan());
    }
    if let Some(error) = &result.error {
        println!("  Error:   {}", error.red());
    }

    Ok(())
}
