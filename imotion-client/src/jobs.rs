//! Job-related API endpoints

use crate::GenerationClient;
use crate::error::Result;
use imotion_core::domain::job::{JobHandle, JobResult};
use imotion_core::domain::params::GenerationParameters;
use imotion_core::dto::job::{StatusResponse, SubmitResponse};

impl GenerationClient {
    /// Submit a new generation job
    ///
    /// The parameters are sent verbatim as the JSON request body.
    ///
    /// # Returns
    /// The handle the service assigned to the job
    ///
    /// # Errors
    /// - [`ClientError::Transport`](crate::ClientError::Transport) on a non-2xx response
    /// - [`ClientError::Network`](crate::ClientError::Network) if the service was unreachable
    pub async fn submit(&self, params: &GenerationParameters) -> Result<JobHandle> {
        let response = self
            .client
            .post(&self.model_endpoint)
            .header(reqwest::header::AUTHORIZATION, self.bearer())
            .json(params)
            .send()
            .await?;

        let submitted: SubmitResponse = self.handle_response(response).await?;
        let handle = JobHandle::from(submitted.data);

        tracing::debug!("Submitted generation job {}", handle);

        Ok(handle)
    }

    /// Fetch the current status of a job
    ///
    /// A job that is still pending or processing is a normal result, not an
    /// error.
    pub async fn fetch_status(&self, handle: &JobHandle) -> Result<JobResult> {
        let url = format!("{}/{}/result", self.result_endpoint, handle);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, self.bearer())
            .send()
            .await?;

        let status: StatusResponse = self.handle_response(response).await?;

        Ok(status.data.into_result(handle.clone()))
    }
}
