//! Scripted repository for controller and session tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use imotion_client::ClientError;
use imotion_core::domain::job::{JobHandle, JobResult, JobStatus};
use imotion_core::domain::params::GenerationParameters;

use crate::repository::JobRepository;

/// One scripted status check answer
#[derive(Debug, Clone)]
pub enum Reply {
    Pending,
    Processing,
    Completed(Vec<&'static str>),
    Failed(Option<&'static str>),
    Http(u16),
}

/// Recorded repository call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Submit(String),
    Status(JobHandle),
}

/// Repository answering from per-job scripts
///
/// Submissions hand out the queued handles in order. A job whose script is
/// exhausted keeps reporting `processing`.
#[derive(Default)]
pub struct FakeRepository {
    submits: Mutex<VecDeque<Result<JobHandle, u16>>>,
    scripts: Mutex<HashMap<JobHandle, VecDeque<Reply>>>,
    calls: Mutex<Vec<Call>>,
    submit_delay: Duration,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful submission returning `id`, followed by `replies`
    pub fn job(self, id: &str, replies: impl IntoIterator<Item = Reply>) -> Self {
        let handle = JobHandle::new(id);
        self.submits.lock().unwrap().push_back(Ok(handle.clone()));
        self.scripts
            .lock()
            .unwrap()
            .insert(handle, replies.into_iter().collect());
        self
    }

    /// Queues a submission rejected with `status`
    pub fn rejected_submit(self, status: u16) -> Self {
        self.submits.lock().unwrap().push_back(Err(status));
        self
    }

    /// Delays every submission by `delay`
    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn status_calls(&self, id: &str) -> usize {
        let handle = JobHandle::new(id);
        self.calls()
            .iter()
            .filter(|c| **c == Call::Status(handle.clone()))
            .count()
    }
}

#[async_trait]
impl JobRepository for FakeRepository {
    async fn submit(&self, params: &GenerationParameters) -> Result<JobHandle, ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Submit(params.prompt.clone()));

        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }

        let next = self.submits.lock().unwrap().pop_front();
        match next {
            Some(Ok(handle)) => Ok(handle),
            Some(Err(status)) => Err(ClientError::transport(status, "scripted failure")),
            None => Err(ClientError::transport(500, "no submission scripted")),
        }
    }

    async fn fetch_status(&self, handle: &JobHandle) -> Result<JobResult, ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Status(handle.clone()));

        let reply = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(handle)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Reply::Processing);

        match reply {
            Reply::Pending => Ok(result(handle, JobStatus::Pending, &[], None)),
            Reply::Processing => Ok(result(handle, JobStatus::Processing, &[], None)),
            Reply::Completed(outputs) => Ok(result(handle, JobStatus::Completed, &outputs, None)),
            Reply::Failed(error) => Ok(result(handle, JobStatus::Failed, &[], error)),
            Reply::Http(status) => Err(ClientError::transport(status, "scripted failure")),
        }
    }
}

fn result(handle: &JobHandle, status: JobStatus, outputs: &[&str], error: Option<&str>) -> JobResult {
    JobResult {
        id: handle.clone(),
        status,
        outputs: outputs.iter().map(|o| o.to_string()).collect(),
        error: error.map(str::to_string),
    }
}

/// Parameters that pass validation
pub fn params(prompt: &str) -> GenerationParameters {
    GenerationParameters {
        image: "u1".to_string(),
        prompt: prompt.to_string(),
        ..GenerationParameters::default()
    }
}
