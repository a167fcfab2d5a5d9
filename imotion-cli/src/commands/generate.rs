//! Generate command handler
//!
//! Builds a request from flags, an example preset or a previous history
//! entry, submits it and follows the job until it settles.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use imotion_core::domain::job::JobHandle;
use imotion_core::domain::params::{GenerationParameters, OutputSize};
use imotion_engine::{GenerationError, GenerationSession, GenerationState, Phase};

use crate::config::Config;
use crate::id_resolver::resolve_entry_id;
use crate::image::load_image;
use crate::types::IdOrPrefix;

/// Flags of the `generate` command
///
/// Every parameter flag overrides the base request, which is the example
/// preset with `--example`, a previous entry with `--from`, or the defaults.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Source image: local file, http(s) URL or data URI
    #[arg(short, long)]
    image: Option<String>,

    /// Text describing the desired motion
    #[arg(short, long)]
    prompt: Option<String>,

    /// Things the video should avoid
    #[arg(long)]
    negative_prompt: Option<String>,

    /// Video length in seconds
    #[arg(long)]
    duration: Option<u32>,

    /// Output size: 832*480, 768*768 or 576*1024
    #[arg(long)]
    size: Option<OutputSize>,

    /// Number of denoising steps
    #[arg(long)]
    steps: Option<u32>,

    /// Classifier-free guidance scale
    #[arg(long)]
    guidance_scale: Option<f64>,

    #[arg(long)]
    flow_shift: Option<f64>,

    /// Seed, -1 for random
    #[arg(long, allow_negative_numbers = true)]
    seed: Option<i64>,

    /// Turn off the service's safety checker
    #[arg(long)]
    no_safety_checker: bool,

    /// Start from the bundled example request
    #[arg(long, conflicts_with = "from")]
    example: bool,

    /// Start from the parameters of a history entry (ID or prefix)
    #[arg(long)]
    from: Option<String>,
}

impl GenerateArgs {
    /// Applies the flags on top of `base`
    fn apply(self, mut base: GenerationParameters) -> Result<GenerationParameters> {
        if let Some(image) = self.image {
            base.image = load_image(&image)?;
        }
        if let Some(prompt) = self.prompt {
            base.prompt = prompt;
        }
        if let Some(negative_prompt) = self.negative_prompt {
            base.negative_prompt = negative_prompt;
        }
        if let Some(duration) = self.duration {
            base.duration = duration;
        }
        if let Some(size) = self.size {
            base.size = size;
        }
        if let Some(steps) = self.steps {
            base.num_inference_steps = steps;
        }
        if let Some(guidance_scale) = self.guidance_scale {
            base.guidance_scale = guidance_scale;
        }
        if let Some(flow_shift) = self.flow_shift {
            base.flow_shift = flow_shift;
        }
        if let Some(seed) = self.seed {
            base.seed = seed;
        }
        if self.no_safety_checker {
            base.enable_safety_checker = false;
        }
        Ok(base)
    }
}

/// Handle the generate command
pub async fn handle_generate(args: GenerateArgs, config: &Config) -> Result<()> {
    let client = Arc::new(config.client()?);
    let session = GenerationSession::new(client, config.store(), config.poll_policy()?);

    let base = if args.example {
        GenerationParameters::example()
    } else if let Some(from) = &args.from {
        let id = resolve_entry_id(&session.history(), &IdOrPrefix::parse(from))?;
        session.params_from_history(id)?
    } else {
        GenerationParameters::default()
    };
    let params = args.apply(base)?;

    let submission = session
        .submit(params)
        .await
        .context("Failed to submit generation request")?;

    println!("{} Job {} submitted", "▸".cyan(), submission.handle.to_string().bold());
    println!("  Entry: {}", submission.entry_id.to_string().dimmed());

    follow_progress(&session, &submission.handle).await;

    match session.wait(&submission.handle).await {
        Ok(result) => {
            println!("{}", "✓ Generation completed".green().bold());
            match result.primary_output() {
                Some(url) => println!("  Video: {}", url.cyan()),
                None => println!("  {}", "The service returned no output".yellow()),
            }
            Ok(())
        }
        Err(GenerationError::TimedOut(attempts)) => {
            println!("{}", "✗ Generation timed out".red().bold());
            anyhow::bail!(
                "Job {} did not finish after {} status checks",
                submission.handle,
                attempts
            )
        }
        Err(e) => {
            println!("{}", "✗ Generation failed".red().bold());
            Err(e.into())
        }
    }
}

/// Renders progress updates until the job reaches a terminal phase
async fn follow_progress(session: &GenerationSession, handle: &JobHandle) {
    let mut rx = session.subscribe();
    loop {
        let done = {
            let state = rx.borrow_and_update();
            render_progress(&state);
            state.handle.as_ref() != Some(handle) || state.phase.is_terminal()
        };
        if done || rx.changed().await.is_err() {
            break;
        }
    }
    println!();
}

fn render_progress(state: &GenerationState) {
    print!("\r  {}", progress_line(state));
    // Progress is cosmetic; a failed flush only delays the redraw.
    let _ = std::io::stdout().flush();
}

fn progress_line(state: &GenerationState) -> String {
    const WIDTH: usize = 30;
    let filled = usize::from(state.progress.min(100)) * WIDTH / 100;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(WIDTH - filled));
    let phase = match state.phase {
        Phase::Completed => state.phase.to_string().green(),
        Phase::Failed | Phase::TimedOut => state.phase.to_string().red(),
        _ => state.phase.to_string().cyan(),
    };
    format!(
        "{} {:>3}% {} (check {})",
        bar, state.progress, phase, state.attempts
    )
}
