//! Jobs repository
//!
//! Abstracts the two remote calls a generation needs:
//! - Submitting the request
//! - Checking the status of the submitted job

use async_trait::async_trait;
use imotion_client::{ClientError, GenerationClient};
use imotion_core::domain::job::{JobHandle, JobResult};
use imotion_core::domain::params::GenerationParameters;

/// Repository trait for job-related operations with the generation service
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Submits a generation request
    ///
    /// # Arguments
    /// * `params` - The request, sent as-is
    ///
    /// # Returns
    /// The handle of the newly created job
    async fn submit(&self, params: &GenerationParameters) -> Result<JobHandle, ClientError>;

    /// Fetches the current status of a job
    ///
    /// A job that is still running is an `Ok` result with a non-terminal status.
    ///
    /// # Arguments
    /// * `handle` - The job to check
    async fn fetch_status(&self, handle: &JobHandle) -> Result<JobResult, ClientError>;
}

#[async_trait]
impl JobRepository for GenerationClient {
    async fn submit(&self, params: &GenerationParameters) -> Result<JobHandle, ClientError> {
        GenerationClient::submit(self, params).await
    }

    async fn fetch_status(&self, handle: &JobHandle) -> Result<JobResult, ClientError> {
        GenerationClient::fetch_status(self, handle).await
    }
}
