//! Job DTOs for the remote generation API

use serde::{Deserialize, Serialize};

use crate::domain::job::{JobHandle, JobResult, JobStatus};

/// `{ "data": ... }` wrapper around every success payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Payload of a successful submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedJob {
    pub id: String,
}

impl From<SubmittedJob> for JobHandle {
    fn from(job: SubmittedJob) -> Self {
        JobHandle::new(job.id)
    }
}

/// Payload of a status check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusPayload {
    pub status: JobStatus,
    #[serde(default)]
    pub outputs: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl JobStatusPayload {
    /// Converts the payload into a result for the job it was fetched for
    ///
    /// Outputs are only kept for completed jobs and the error only for failed ones.
    pub fn into_result(self, id: JobHandle) -> JobResult {
        let outputs = match self.status {
            JobStatus::Completed => self.outputs.unwrap_or_default(),
            _ => Vec::new(),
        };
        let error = match self.status {
            JobStatus::Failed => self.error.filter(|e| !e.is_empty()),
            _ => None,
        };

        JobResult {
            id,
            status: self.status,
            outputs,
            error,
        }
    }
}

/// Submission response as sent by the service
pub type SubmitResponse = Envelope<SubmittedJob>;

/// Status response as sent by the service
pub type StatusResponse = Envelope<JobStatusPayload>;
