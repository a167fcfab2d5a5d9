//! ImageMotion Engine
//!
//! Drives image-to-video generation jobs and keeps their local history.
//!
//! Architecture:
//! - Repository: the `JobRepository` seam over the remote API (HTTP client or test fakes)
//! - Controller: the submit / poll state machine publishing observable state
//! - Store: persisted key-value collaborator (in-memory or JSON files)
//! - History: most-recent-first log of submissions, reconciled by job handle
//! - Session: validates requests and wires the controller into the history
//!
//! The controller polls the service until the job completes, fails or
//! exhausts its attempt budget, and the session merges the final result into
//! the matching history entry.

pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod repository;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use config::PollPolicy;
pub use controller::{GenerationController, GenerationState, Phase};
pub use error::{GenerationError, Result};
pub use history::HistoryStore;
pub use repository::JobRepository;
pub use session::{GenerationSession, Submission};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
