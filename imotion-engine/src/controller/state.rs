//! Observable controller state

use imotion_core::domain::job::{JobHandle, JobResult};

/// Lifecycle phase of the current generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Waiting for the service to accept the request
    Submitting,
    /// Job accepted, status checks in progress
    Polling,
    Completed,
    /// Submission or a status check failed, or the service reported failure
    Failed,
    /// The status check budget ran out
    TimedOut,
}

impl Phase {
    /// Terminal phases persist until the next submission
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed | Phase::TimedOut)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Submitting | Phase::Polling)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Submitting => write!(f, "Submitting"),
            Phase::Polling => write!(f, "Polling"),
            Phase::Completed => write!(f, "Completed"),
            Phase::Failed => write!(f, "Failed"),
            Phase::TimedOut => write!(f, "TimedOut"),
        }
    }
}

/// Snapshot published by the controller after every transition
///
/// `progress`, `result`, `error` and [`is_generating`](Self::is_generating)
/// are what presentation layers render; `phase`, `handle` and `attempts`
/// give the detail behind them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationState {
    pub phase: Phase,
    /// Job being tracked, once the service accepted the request
    pub handle: Option<JobHandle>,
    /// Estimated completion percentage, 0-100
    pub progress: u8,
    /// Last status fetched for the job
    pub result: Option<JobResult>,
    pub error: Option<String>,
    /// Status checks performed for the current job
    pub attempts: u32,
    /// Submission counter; writes carrying an older value are discarded
    pub(crate) epoch: u64,
}

impl GenerationState {
    /// True while a request is being submitted or polled
    pub fn is_generating(&self) -> bool {
        self.phase.is_active()
    }

    /// Whether this snapshot belongs to the given job and is final
    pub fn is_finished_for(&self, handle: &JobHandle) -> bool {
        self.phase.is_terminal() && self.handle.as_ref() == Some(handle)
    }

    /// Primary output of a completed job
    pub fn output(&self) -> Option<&str> {
        self.result.as_ref().and_then(JobResult::primary_output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle() {
        let state = GenerationState::default();
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.progress, 0);
        assert!(!state.is_generating());
        assert!(state.result.is_none());
        assert!(state.error.is_none());
    }

    #[test]
    fn test_phase_classification() {
        assert!(Phase::Submitting.is_active());
        assert!(Phase::Polling.is_active());
        for phase in [Phase::Completed, Phase::Failed, Phase::TimedOut] {
            assert!(phase.is_terminal());
            assert!(!phase.is_active());
        }
        assert!(!Phase::Idle.is_terminal());
    }
}
