//! History domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::job::{JobHandle, JobResult};
use super::params::GenerationParameters;

/// One recorded submission
///
/// Created when a request is submitted and later completed with the job's
/// result. The `job` handle is the key used to match incoming results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub params: GenerationParameters,
    #[serde(default)]
    pub job: Option<JobHandle>,
    #[serde(default)]
    pub result: Option<JobResult>,
    /// URL of the generated video, derived from the first result output
    #[serde(default)]
    pub primary_output: Option<String>,
}

impl HistoryEntry {
    /// Creates a fresh entry for a submission happening now
    pub fn new(params: GenerationParameters) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            params,
            job: None,
            result: None,
            primary_output: None,
        }
    }

    /// Whether the entry already holds a terminal result
    pub fn is_settled(&self) -> bool {
        self.result.as_ref().is_some_and(JobResult::is_terminal)
    }

    /// Attaches a job result unless a terminal one is already recorded
    ///
    /// Returns `true` when the entry changed.
    pub fn attach_result(&mut self, result: &JobResult) -> bool {
        if self.is_settled() || self.result.as_ref() == Some(result) {
            return false;
        }

        self.primary_output = result.primary_output().map(str::to_string);
        self.result = Some(result.clone());
        true
    }

    /// Prompt shortened for list views
    pub fn prompt_preview(&self, max_chars: usize) -> String {
        let prompt = &self.params.prompt;
        if prompt.chars().count() <= max_chars {
            return prompt.clone();
        }
        let truncated: String = prompt.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::JobStatus;

    fn result(status: JobStatus, outputs: &[&str]) -> JobResult {
        JobResult {
            id: JobHandle::new("job-1"),
            status,
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            error: None,
        }
    }

    #[test]
    fn test_attach_result_derives_primary_output() {
        let mut entry = HistoryEntry::new(GenerationParameters::default());
        assert!(entry.attach_result(&result(JobStatus::Completed, &["v1", "v2"])));
        assert_eq!(entry.primary_output.as_deref(), Some("v1"));
        assert!(entry.is_settled());
    }

    #[test]
    fn test_attach_result_is_idempotent() {
        let completed = result(JobStatus::Completed, &["v1"]);

        let mut once = HistoryEntry::new(GenerationParameters::default());
        once.attach_result(&completed);

        let mut twice = once.clone();
        assert!(!twice.attach_result(&completed));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_settled_entry_ignores_stale_results() {
        let mut entry = HistoryEntry::new(GenerationParameters::default());
        entry.attach_result(&result(JobStatus::Completed, &["v1"]));

        assert!(!entry.attach_result(&result(JobStatus::Processing, &[])));
        assert_eq!(entry.result.as_ref().unwrap().status, JobStatus::Completed);
        assert_eq!(entry.primary_output.as_deref(), Some("v1"));
    }

    #[test]
    fn test_in_flight_result_can_be_superseded() {
        let mut entry = HistoryEntry::new(GenerationParameters::default());
        entry.attach_result(&result(JobStatus::Processing, &[]));
        assert!(!entry.is_settled());

        assert!(entry.attach_result(&result(JobStatus::Completed, &["v1"])));
        assert_eq!(entry.primary_output.as_deref(), Some("v1"));
    }

    #[test]
    fn test_prompt_preview() {
        let mut params = GenerationParameters::default();
        params.prompt = "a".repeat(120);
        let entry = HistoryEntry::new(params);

        let preview = entry.prompt_preview(100);
        assert_eq!(preview.len(), 103);
        assert!(preview.ends_with("..."));
    }
}
