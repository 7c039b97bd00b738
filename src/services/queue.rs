use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::utils::{ApiError, ApiResult};

/// One unit of asynchronous background work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: Uuid,
    pub payload: JobPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobPayload {
    ProcessTicket { ticket_id: Uuid },
    /// A single job that iterates the whole batch, not one job per id.
    ProcessBatch { ticket_ids: Vec<Uuid> },
}

/// Handle returned to the caller at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: Uuid,
}

/// Hands ticket ids to a background queue. Dispatch never blocks on
/// execution and gives no ordering guarantee against job start.
#[async_trait]
pub trait JobDispatcher: Send + Sync {
    async fn enqueue(&self, ticket_id: Uuid) -> ApiResult<JobHandle>;
    async fn enqueue_many(&self, ticket_ids: Vec<Uuid>) -> ApiResult<JobHandle>;
}

/// Redis-backed job queue. Jobs are JSON payloads on a list; retry and
/// scheduling policy live in the broker/worker configuration, not here.
#[derive(Clone)]
pub struct RedisJobQueue {
    client: Arc<redis::Client>,
    queue_key: String,
}

impl RedisJobQueue {
    pub fn new(broker_url: &str, queue_key: &str) -> ApiResult<Self> {
        let client = redis::Client::open(broker_url)
            .map_err(|e| ApiError::queue(format!("invalid broker URL: {}", e)))?;

        Ok(Self { client: Arc::new(client), queue_key: queue_key.to_string() })
    }

    async fn push(&self, job: &Job) -> ApiResult<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| ApiError::queue(format!("broker connection error: {}", e)))?;

        let payload = serde_json::to_string(job)
            .map_err(|e| ApiError::queue(format!("failed to serialize job: {}", e)))?;

        let _: () = redis::cmd("LPUSH")
            .arg(&self.queue_key)
            .arg(&payload)
            .query_async(&mut conn)
            .await
            .map_err(|e| ApiError::queue(format!("failed to enqueue job: {}", e)))?;

        Ok(())
    }

    /// Block up to `timeout_secs` waiting for the next job.
    pub async fn pop(&self, timeout_secs: u64) -> ApiResult<Option<Job>> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| ApiError::queue(format!("broker connection error: {}", e)))?;

        let entry: Option<(String, String)> = redis::cmd("BRPOP")
            .arg(&self.queue_key)
            .arg(timeout_secs)
            .query_async(&mut conn)
            .await
            .map_err(|e| ApiError::queue(format!("failed to dequeue job: {}", e)))?;

        match entry {
            Some((_key, raw)) => {
                let job = serde_json::from_str(&raw)
                    .map_err(|e| ApiError::queue(format!("malformed job payload: {}", e)))?;
                Ok(Some(job))
            },
            None => Ok(None),
        }
    }
}

#[async_trait]
impl JobDispatcher for RedisJobQueue {
    async fn enqueue(&self, ticket_id: Uuid) -> ApiResult<JobHandle> {
        let job = Job {
            job_id: Uuid::new_v4(),
            payload: JobPayload::ProcessTicket { ticket_id },
        };
        self.push(&job).await?;
        tracing::debug!("Enqueued processing job {} for ticket {}", job.job_id, ticket_id);
        Ok(JobHandle { job_id: job.job_id })
    }

    async fn enqueue_many(&self, ticket_ids: Vec<Uuid>) -> ApiResult<JobHandle> {
        let count = ticket_ids.len();
        let job = Job {
            job_id: Uuid::new_v4(),
            payload: JobPayload::ProcessBatch { ticket_ids },
        };
        self.push(&job).await?;
        tracing::debug!("Enqueued batch job {} covering {} tickets", job.job_id, count);
        Ok(JobHandle { job_id: job.job_id })
    }
}
