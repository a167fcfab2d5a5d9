//! Generation history
//!
//! Append-only, most-recent-first log of submissions. Entries are created
//! when a request is submitted, tagged with the job handle once the service
//! accepts it, and completed when the job's result arrives. Results are
//! matched to entries by job handle, so overlapping submissions cannot write
//! into each other's records.
//!
//! Every mutation is written back to the key-value store. Persistence is
//! best effort: a failed write is logged and the in-memory history stays
//! authoritative for the running process.

use std::sync::Arc;

use imotion_core::domain::history::HistoryEntry;
use imotion_core::domain::job::{JobHandle, JobResult};
use imotion_core::domain::params::GenerationParameters;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::store::{self, KeyValueStore};

/// Store key the history document lives under
pub const HISTORY_KEY: &str = "generation_history";

/// Owner of the history sequence
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Loads the history from `store`, starting empty if nothing usable is stored
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let entries: Vec<HistoryEntry> = store::load_or_default(store.as_ref(), HISTORY_KEY, Vec::new());
        debug!("Loaded {} history entries", entries.len());
        Self { store, entries }
    }

    /// All entries, most recent first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn get(&self, id: Uuid) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entry tracking the given job
    pub fn find_by_job(&self, handle: &JobHandle) -> Option<&HistoryEntry> {
        self.entries
            .iter()
            .find(|e| e.job.as_ref() == Some(handle))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records a new submission at the front of the history
    ///
    /// # Returns
    /// The id of the new entry
    pub fn record_submission(&mut self, params: GenerationParameters) -> Uuid {
        let entry = HistoryEntry::new(params);
        let id = entry.id;
        self.entries.insert(0, entry);
        self.persist();

        info!("Recorded submission {}", id);
        id
    }

    /// Tags an entry with the job the service created for it
    ///
    /// An entry's job is set once; returns `false` if the entry is unknown or
    /// already tagged.
    pub fn attach_job(&mut self, entry_id: Uuid, handle: JobHandle) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == entry_id) else {
            warn!("Cannot attach job {}: entry {} not found", handle, entry_id);
            return false;
        };

        if entry.job.is_some() {
            return false;
        }

        debug!("Entry {} tracks job {}", entry_id, handle);
        entry.job = Some(handle);
        self.persist();
        true
    }

    /// Merges a job result into the entry tracking that job
    ///
    /// Only the matching entry is touched. Applying a result to an entry that
    /// already holds a terminal result is a no-op.
    ///
    /// # Returns
    /// `true` if an entry changed
    pub fn reconcile(&mut self, result: &JobResult) -> bool {
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.job.as_ref() == Some(&result.id))
        else {
            debug!("No history entry tracks job {}", result.id);
            return false;
        };

        if !entry.attach_result(result) {
            return false;
        }

        info!(
            "Job {} recorded as {} in entry {}",
            result.id, result.status, entry.id
        );
        self.persist();
        true
    }

    fn persist(&self) {
        if let Err(e) = store::save(self.store.as_ref(), HISTORY_KEY, &self.entries) {
            warn!("Failed to persist history: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};
    use imotion_core::domain::job::JobStatus;

    fn params(prompt: &str) -> GenerationParameters {
        GenerationParameters {
            image: "u1".to_string(),
            prompt: prompt.to_string(),
            ..GenerationParameters::default()
        }
    }

    fn completed(id: &str, output: &str) -> JobResult {
        JobResult {
            id: JobHandle::new(id),
            status: JobStatus::Completed,
            outputs: vec![output.to_string()],
            error: None,
        }
    }

    #[test]
    fn test_submissions_are_prepended() {
        let mut history = HistoryStore::load(Arc::new(MemoryStore::new()));
        let first = history.record_submission(params("one"));
        let second = history.record_submission(params("two"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].id, second);
        assert_eq!(history.entries()[1].id, first);
        assert_eq!(history.latest().unwrap().params.prompt, "two");
    }

    #[test]
    fn test_reconcile_matches_by_job_not_position() {
        let mut history = HistoryStore::load(Arc::new(MemoryStore::new()));
        let older = history.record_submission(params("one"));
        history.attach_job(older, JobHandle::new("job-a"));
        let newer = history.record_submission(params("two"));
        history.attach_job(newer, JobHandle::new("job-b"));

        assert!(history.reconcile(&completed("job-a", "va")));

        assert_eq!(history.get(older).unwrap().primary_output.as_deref(), Some("va"));
        assert!(history.get(newer).unwrap().result.is_none());
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut history = HistoryStore::load(Arc::new(MemoryStore::new()));
        let id = history.record_submission(params("one"));
        history.attach_job(id, JobHandle::new("job-a"));

        assert!(history.reconcile(&completed("job-a", "v1")));
        let once = history.get(id).cloned();
        assert!(!history.reconcile(&completed("job-a", "v1")));
        assert_eq!(history.get(id).cloned(), once);
    }

    #[test]
    fn test_unknown_job_is_ignored() {
        let mut history = HistoryStore::load(Arc::new(MemoryStore::new()));
        history.record_submission(params("one"));
        assert!(!history.reconcile(&completed("job-x", "v1")));
    }

    #[test]
    fn test_job_is_attached_once() {
        let mut history = HistoryStore::load(Arc::new(MemoryStore::new()));
        let id = history.record_submission(params("one"));
        assert!(history.attach_job(id, JobHandle::new("job-a")));
        assert!(!history.attach_job(id, JobHandle::new("job-b")));
        assert!(!history.attach_job(Uuid::new_v4(), JobHandle::new("job-c")));
        assert_eq!(
            history.find_by_job(&JobHandle::new("job-a")).map(|e| e.id),
            Some(id)
        );
    }

    #[test]
    fn test_history_survives_reload() {
        let store = Arc::new(MemoryStore::new());
        let id = {
            let mut history = HistoryStore::load(store.clone());
            let id = history.record_submission(params("one"));
            history.attach_job(id, JobHandle::new("job-a"));
            history.reconcile(&completed("job-a", "v1"));
            id
        };

        let reloaded = HistoryStore::load(store);
        assert_eq!(reloaded.len(), 1);
        let entry = reloaded.get(id).unwrap();
        assert_eq!(entry.job, Some(JobHandle::new("job-a")));
        assert_eq!(entry.primary_output.as_deref(), Some("v1"));
    }

    #[test]
    fn test_corrupt_document_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(HISTORY_KEY, "{\"version\": 2}").unwrap();
        let history = HistoryStore::load(store);
        assert!(history.is_empty());
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::InvalidKey(key.to_string()))
        }
    }

    #[test]
    fn test_failed_writes_do_not_lose_entries() {
        let mut history = HistoryStore::load(Arc::new(ReadOnlyStore));
        history.record_submission(params("one"));
        assert_eq!(history.len(), 1);
    }
}
