//! Generation controller
//!
//! Submits a generation request and polls the job until it completes, fails
//! or runs out of status checks. Every transition is published as a
//! [`GenerationState`] snapshot on a watch channel.
//!
//! Only one polling task is alive per controller. A new submission aborts
//! the previous task and advances the state epoch; every write from a task or
//! an in-flight submit call is conditional on its epoch still being current,
//! so results of a superseded job never reach the published state.

mod state;

pub use state::{GenerationState, Phase};

use std::sync::{Arc, Mutex, PoisonError};

use imotion_core::domain::job::{JobHandle, JobResult, JobStatus};
use imotion_core::domain::params::GenerationParameters;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::PollPolicy;
use crate::error::{GenerationError, Result};
use crate::repository::JobRepository;

/// Error recorded when a generation is stopped before it settled
pub const CANCELLED_MESSAGE: &str = "Generation cancelled";

/// Submit / poll state machine for one generation at a time
pub struct GenerationController {
    repository: Arc<dyn JobRepository>,
    policy: PollPolicy,
    state: Arc<watch::Sender<GenerationState>>,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl GenerationController {
    /// Creates an idle controller
    pub fn new(repository: Arc<dyn JobRepository>, policy: PollPolicy) -> Self {
        let (state, _) = watch::channel(GenerationState::default());
        Self {
            repository,
            policy,
            state: Arc::new(state),
            poll_task: Mutex::new(None),
        }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Current state snapshot
    pub fn state(&self) -> GenerationState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.state.subscribe()
    }

    pub fn is_generating(&self) -> bool {
        self.state.borrow().is_generating()
    }

    pub fn progress(&self) -> u8 {
        self.state.borrow().progress
    }

    pub fn result(&self) -> Option<JobResult> {
        self.state.borrow().result.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Whether a polling task is scheduled or running
    pub fn has_pending_poll(&self) -> bool {
        self.lock_task()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Submits a request and starts polling the created job
    ///
    /// Any polling of a previous job is cancelled first. The parameters are
    /// not validated here; callers are expected to have done so.
    ///
    /// # Returns
    /// The handle of the submitted job
    ///
    /// # Errors
    /// - [`GenerationError::Client`] if the service rejected or never received the request
    /// - [`GenerationError::Superseded`] if another submission started meanwhile
    pub async fn submit(&self, params: &GenerationParameters) -> Result<JobHandle> {
        let epoch = self.begin_submission();

        info!("Submitting generation request");

        match self.repository.submit(params).await {
            Ok(handle) => {
                let accepted = publish(&self.state, epoch, |s| {
                    s.phase = Phase::Polling;
                    s.handle = Some(handle.clone());
                });
                if !accepted {
                    debug!("Discarding job {} from a superseded submission", handle);
                    return Err(GenerationError::Superseded);
                }

                info!("Job {} accepted, polling for status", handle);
                self.spawn_poll_task(handle.clone(), epoch);
                Ok(handle)
            }
            Err(e) => {
                error!("Failed to submit generation request: {}", e);
                let message = e.to_string();
                let current = publish(&self.state, epoch, |s| {
                    s.phase = Phase::Failed;
                    s.error = Some(message);
                });
                if !current {
                    return Err(GenerationError::Superseded);
                }
                Err(e.into())
            }
        }
    }

    /// Stops polling and invalidates the tracked job
    ///
    /// A generation still in flight ends as [`Phase::Failed`] so that waiting
    /// subscribers are released; a settled state is kept as is. Late results
    /// of the cancelled job are discarded.
    pub fn shutdown(&self) {
        let mut task = self.lock_task();
        if let Some(task) = task.take() {
            task.abort();
        }
        self.state.send_modify(|s| {
            s.epoch += 1;
            if s.phase.is_active() {
                info!("Generation cancelled by shutdown");
                s.phase = Phase::Failed;
                s.error = Some(CANCELLED_MESSAGE.to_string());
            }
        });
    }

    /// Resets the state for a new submission and cancels any polling
    fn begin_submission(&self) -> u64 {
        let mut task = self.lock_task();
        if let Some(previous) = task.take() {
            debug!("Cancelling polling of the previous job");
            previous.abort();
        }

        let mut epoch = 0;
        self.state.send_modify(|s| {
            epoch = s.epoch + 1;
            *s = GenerationState {
                phase: Phase::Submitting,
                epoch,
                ..GenerationState::default()
            };
        });
        epoch
    }

    fn spawn_poll_task(&self, handle: JobHandle, epoch: u64) {
        let mut task = self.lock_task();

        // A newer submission may have started between publishing and here.
        if self.state.borrow().epoch != epoch {
            return;
        }

        let repository = Arc::clone(&self.repository);
        let state = Arc::clone(&self.state);
        let policy = self.policy.clone();

        *task = Some(tokio::spawn(async move {
            poll_job(repository, state, policy, handle, epoch).await;
        }));
    }

    fn lock_task(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.poll_task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for GenerationController {
    fn drop(&mut self) {
        if let Some(task) = self.lock_task().take() {
            task.abort();
        }
    }
}

/// Applies `update` if `epoch` is still the current one
///
/// Returns `false` when the write was discarded.
fn publish(
    state: &watch::Sender<GenerationState>,
    epoch: u64,
    update: impl FnOnce(&mut GenerationState),
) -> bool {
    state.send_if_modified(|s| {
        if s.epoch != epoch {
            return false;
        }
        update(s);
        true
    })
}

/// Polls one job until it reaches a terminal phase
///
/// The first check runs immediately; later ones are spaced by the policy
/// interval. Returns early once a write is rejected, meaning a newer
/// submission took over.
async fn poll_job(
    repository: Arc<dyn JobRepository>,
    state: Arc<watch::Sender<GenerationState>>,
    policy: PollPolicy,
    handle: JobHandle,
    epoch: u64,
) {
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        debug!("Checking status of job {} (attempt {})", handle, attempts);

        let outcome = repository.fetch_status(&handle).await;

        let (current, keep_polling) = match outcome {
            Err(e) => {
                error!("Status check for job {} failed: {}", handle, e);
                let message = e.to_string();
                let current = publish(&state, epoch, |s| {
                    s.phase = Phase::Failed;
                    s.error = Some(message);
                    s.attempts = attempts;
                });
                (current, false)
            }
            Ok(result) => match result.status {
                JobStatus::Completed => {
                    info!("Job {} completed after {} status checks", handle, attempts);
                    let current = publish(&state, epoch, |s| {
                        s.phase = Phase::Completed;
                        s.progress = 100;
                        s.result = Some(result);
                        s.attempts = attempts;
                    });
                    (current, false)
                }
                JobStatus::Failed => {
                    let message = result
                        .error
                        .clone()
                        .unwrap_or_else(|| "Generation failed".to_string());
                    warn!("Job {} failed: {}", handle, message);
                    let current = publish(&state, epoch, |s| {
                        s.phase = Phase::Failed;
                        s.error = Some(message);
                        s.result = Some(result);
                        s.attempts = attempts;
                    });
                    (current, false)
                }
                JobStatus::Pending | JobStatus::Processing => {
                    let estimate = policy.progress_for(attempts);
                    let exhausted = attempts >= policy.max_attempts;
                    if exhausted {
                        warn!("Job {} still unfinished after {} status checks", handle, attempts);
                    }
                    let current = publish(&state, epoch, |s| {
                        s.progress = s.progress.max(estimate);
                        s.result = Some(result);
                        s.attempts = attempts;
                        if exhausted {
                            s.phase = Phase::TimedOut;
                            s.error = Some(GenerationError::TimedOut(attempts).to_string());
                        }
                    });
                    (current, !exhausted)
                }
            },
        };

        if !current {
            debug!("Stopped polling superseded job {}", handle);
            return;
        }

        if !keep_polling {
            return;
        }

        tokio::time::sleep(policy.interval).await;
    }
}
