//! Generation session
//!
//! Wires user requests to the controller and keeps the history in sync:
//! - Validates parameters before anything is recorded or sent
//! - Records a history entry per submission and tags it with the job handle
//! - Merges final job results into the matching entry
//!
//! Results are merged by a background task watching the controller state,
//! and again when a caller waits for a job. Reconciliation is idempotent, so
//! the overlap is harmless.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use imotion_core::domain::history::HistoryEntry;
use imotion_core::domain::job::{JobHandle, JobResult};
use imotion_core::domain::params::GenerationParameters;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::PollPolicy;
use crate::controller::{GenerationController, GenerationState, Phase};
use crate::error::{GenerationError, Result};
use crate::history::HistoryStore;
use crate::repository::JobRepository;
use crate::store::KeyValueStore;

/// A request accepted by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// History entry recording the request
    pub entry_id: Uuid,
    /// Job created by the service
    pub handle: JobHandle,
}

/// Controller plus history, driven together
pub struct GenerationSession {
    controller: GenerationController,
    history: Arc<Mutex<HistoryStore>>,
    reconciler: JoinHandle<()>,
}

impl GenerationSession {
    /// Creates a session, loading the history from `store`
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        repository: Arc<dyn JobRepository>,
        store: Arc<dyn KeyValueStore>,
        policy: PollPolicy,
    ) -> Self {
        let controller = GenerationController::new(repository, policy);
        let history = Arc::new(Mutex::new(HistoryStore::load(store)));
        let reconciler = spawn_reconciler(controller.subscribe(), Arc::clone(&history));

        Self {
            controller,
            history,
            reconciler,
        }
    }

    pub fn controller(&self) -> &GenerationController {
        &self.controller
    }

    /// Current controller state
    pub fn state(&self) -> GenerationState {
        self.controller.state()
    }

    /// Receiver notified on every controller state change
    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.controller.subscribe()
    }

    /// History snapshot, most recent first
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.lock_history().entries().to_vec()
    }

    pub fn history_entry(&self, id: Uuid) -> Option<HistoryEntry> {
        self.lock_history().get(id).cloned()
    }

    /// Parameters of a recorded entry, for resubmission
    pub fn params_from_history(&self, id: Uuid) -> Result<GenerationParameters> {
        self.history_entry(id)
            .map(|entry| entry.params)
            .ok_or(GenerationError::EntryNotFound(id))
    }

    /// Validates, records and submits a generation request
    ///
    /// Invalid parameters are rejected before a history entry is created or
    /// any call is made. If the submission itself fails, the entry stays in
    /// the history without a job as a record of the attempt.
    pub async fn submit(&self, params: GenerationParameters) -> Result<Submission> {
        params.validate()?;

        // Settle the outgoing job before its state is replaced.
        reconcile_state(&self.history, &self.controller.state());

        let entry_id = self.lock_history().record_submission(params.clone());

        let handle = self.controller.submit(&params).await?;
        self.lock_history().attach_job(entry_id, handle.clone());

        info!("Submission {} is tracked as job {}", entry_id, handle);

        Ok(Submission { entry_id, handle })
    }

    /// Waits until the job reaches a terminal phase and records its result
    ///
    /// # Returns
    /// The completed job's result
    ///
    /// # Errors
    /// - [`GenerationError::Failed`] if the job failed
    /// - [`GenerationError::TimedOut`] if the status check budget ran out
    /// - [`GenerationError::Superseded`] if another submission replaced it
    pub async fn wait(&self, handle: &JobHandle) -> Result<JobResult> {
        let mut rx = self.controller.subscribe();
        let state = rx
            .wait_for(|s| s.handle.as_ref() != Some(handle) || s.phase.is_terminal())
            .await
            .map_err(|_| GenerationError::Superseded)?
            .clone();

        if state.handle.as_ref() != Some(handle) {
            return Err(GenerationError::Superseded);
        }

        reconcile_state(&self.history, &state);

        let message = state.error.clone().unwrap_or_default();
        match (state.phase, state.result) {
            (Phase::Completed, Some(result)) => Ok(result),
            (Phase::TimedOut, _) => Err(GenerationError::TimedOut(state.attempts)),
            _ => Err(GenerationError::Failed(message)),
        }
    }

    /// Submits a request and waits for its outcome
    pub async fn generate(&self, params: GenerationParameters) -> Result<JobResult> {
        let submission = self.submit(params).await?;
        self.wait(&submission.handle).await
    }

    fn lock_history(&self) -> MutexGuard<'_, HistoryStore> {
        lock(&self.history)
    }
}

impl Drop for GenerationSession {
    fn drop(&mut self) {
        self.reconciler.abort();
        self.controller.shutdown();
    }
}

fn lock(history: &Mutex<HistoryStore>) -> MutexGuard<'_, HistoryStore> {
    history.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Merges the result of a finished job into the history
///
/// Only results the service reported as final are recorded. A job that timed
/// out or lost its status check keeps its entry without a result.
fn reconcile_state(history: &Mutex<HistoryStore>, state: &GenerationState) {
    if !state.phase.is_terminal() {
        return;
    }
    if let Some(result) = state.result.as_ref().filter(|r| r.is_terminal()) {
        lock(history).reconcile(result);
    }
}

/// Background task reconciling every terminal state the controller publishes
fn spawn_reconciler(
    mut rx: watch::Receiver<GenerationState>,
    history: Arc<Mutex<HistoryStore>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            reconcile_state(&history, &state);
        }
        debug!("Controller gone, history reconciler stopped");
    })
}
