//! Job domain types

use serde::{Deserialize, Serialize};

/// Opaque identifier the service returns for a submitted job
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobHandle {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for JobHandle {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Remote job status
///
/// A job moves from `Pending`/`Processing` to exactly one of the terminal
/// statuses and never leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Snapshot of a job as reported by one status check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub id: JobHandle,
    pub status: JobStatus,
    /// Output asset URLs, only populated once the job completed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
    /// Service-provided failure reason, only set when the job failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobResult {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// First output asset, the generated video
    pub fn primary_output(&self) -> Option<&str> {
        self.outputs.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        let status: JobStatus = serde_json::from_str("\"processing\"").unwrap();
        assert_eq!(status, JobStatus::Processing);
        assert_eq!(serde_json::to_string(&JobStatus::Completed).unwrap(), "\"completed\"");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_primary_output() {
        let result = JobResult {
            id: JobHandle::new("abc"),
            status: JobStatus::Completed,
            outputs: vec!["v1".to_string(), "v2".to_string()],
            error: None,
        };
        assert_eq!(result.primary_output(), Some("v1"));
    }

    #[test]
    fn test_handle_is_transparent() {
        let json = serde_json::to_string(&JobHandle::new("job-1")).unwrap();
        assert_eq!(json, "\"job-1\"");
    }
}
