//! Engine error types

use imotion_client::ClientError;
use imotion_core::domain::params::ValidationError;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Ways a generation request can end without a video
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Rejected before anything was sent
    #[error("Invalid parameters: {0}")]
    Validation(#[from] ValidationError),

    /// Transport, network or parse failure talking to the service
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The service reported the job as failed
    #[error("{0}")]
    Failed(String),

    /// The attempt budget ran out before the job finished
    #[error("Generation timed out after {0} status checks")]
    TimedOut(u32),

    /// A newer submission replaced this one
    #[error("Generation was superseded by a newer submission")]
    Superseded,

    /// No history entry with this id exists
    #[error("History entry {0} not found")]
    EntryNotFound(Uuid),
}
