//! History command handlers
//!
//! Lists and inspects the locally recorded generations.

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use imotion_core::domain::history::HistoryEntry;

use super::colorize_status;
use crate::config::Config;
use crate::id_resolver::resolve_entry_id;
use crate::types::IdOrPrefix;

/// Characters of the prompt shown in list views
const PROMPT_PREVIEW_CHARS: usize = 100;

/// History subcommands
#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List previous generations, most recent first
    List {
        /// Show at most this many entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show one generation in detail
    Show {
        /// Entry ID or unambiguous prefix
        id: String,
    },
}

/// Handle history commands
pub fn handle_history_command(command: HistoryCommands, config: &Config) -> Result<()> {
    let history = config.history();

    match command {
        HistoryCommands::List { limit } => {
            let entries = history.entries();
            if entries.is_empty() {
                println!("{}", "No generations recorded yet.".yellow());
                return Ok(());
            }

            let shown = limit.unwrap_or(entries.len()).min(entries.len());
            println!(
                "{}",
                format!("Showing {} of {} generation(s):", shown, entries.len()).bold()
            );
            println!();
            for entry in &entries[..shown] {
                print_entry_summary(entry);
            }
            Ok(())
        }
        HistoryCommands::Show { id } => {
            let id = resolve_entry_id(history.entries(), &IdOrPrefix::parse(&id))?;
            let entry = history
                .get(id)
                .ok_or_else(|| anyhow::anyhow!("History entry {} not found", id))?;
            print_entry_details(entry);
            Ok(())
        }
    }
}

/// Print a one-glance summary of an entry
fn print_entry_summary(entry: &HistoryEntry) {
    println!("  {} Entry {}", "▸".cyan(), entry.id.to_string().dimmed());
    println!(
        "    Created: {}",
        entry
            .created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!("    Status:  {}", entry_status(entry));
    println!("    Prompt:  {}", entry.prompt_preview(PROMPT_PREVIEW_CHARS));
    if let Some(url) = &entry.primary_output {
        println!("    Video:   {}", url.cyan());
    }
    println!();
}

/// Print everything recorded for an entry
fn print_entry_details(entry: &HistoryEntry) {
    let params = &entry.params;

    println!("{}", "Generation Details:".bold());
    println!("  ID:       {}", entry.id.to_string().cyan());
    println!("  Created:  {}", entry.created_at.format("%Y-%m-%d %H:%M:%S"));
    match &entry.job {
        Some(job) => println!("  Job:      {}", job),
        None => println!("  Job:      {}", "never accepted by the service".dimmed()),
    }
    println!("  Status:   {}", entry_status(entry));

    println!("\n{}", "Parameters:".bold());
    println!("  {} = {}", "prompt".cyan(), params.prompt);
    if !params.negative_prompt.is_empty() {
        println!("  {} = {}", "negative_prompt".cyan(), params.negative_prompt);
    }
    println!("  {} = {}", "image".cyan(), image_summary(&params.image));
    println!("  {} = {}s", "duration".cyan(), params.duration);
    println!("  {} = {}", "size".cyan(), params.size);
    println!("  {} = {}", "num_inference_steps".cyan(), params.num_inference_steps);
    println!("  {} = {}", "guidance_scale".cyan(), params.guidance_scale);
    println!("  {} = {}", "flow_shift".cyan(), params.flow_shift);
    println!("  {} = {}", "seed".cyan(), params.seed);
    println!(
        "  {} = {}",
        "enable_safety_checker".cyan(),
        params.enable_safety_checker
    );

    if let Some(result) = &entry.result {
        println!("\n{}", "Result:".bold());
        println!("  Status:   {}", colorize_status(result.status));
        for output in &result.outputs {
            println!("  Output:   {}", output.cyan());
        }
        if let Some(error) = &result.error {
            println!("\n{}", "Error:".bold());
            println!("{}", error.red());
        }
    }
}

fn entry_status(entry: &HistoryEntry) -> ColoredString {
    match (&entry.job, &entry.result) {
        (_, Some(result)) => colorize_status(result.status),
        (Some(_), None) => "submitted".yellow(),
        (None, None) => "not submitted".dimmed(),
    }
}

/// Inline images are shortened to their header
fn image_summary(image: &str) -> String {
    match image.split_once(',') {
        Some((header, data)) if image.starts_with("data:") => {
            format!("{},<{} bytes encoded>", header, data.len())
        }
        _ => image.to_string(),
    }
}
