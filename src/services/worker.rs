use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::models::TicketStatus;
use crate::services::llm::{ResponseDrafter, TicketClassifier};
use crate::services::queue::{Job, JobPayload, RedisJobQueue};
use crate::services::ticket_service::TicketService;
use crate::utils::{ApiError, ApiResult};

const POP_TIMEOUT_SECS: u64 = 5;
const BROKER_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Background ticket processor.
///
/// Drives a ticket through submitted -> processing -> processed, with
/// processing -> submitted as the only failure-recovery edge. A ticket must
/// never be stranded in `processing` after an attempt ends, so it stays
/// visible to the next bulk-trigger scan.
pub struct TicketProcessor {
    tickets: TicketService,
    classifier: Arc<dyn TicketClassifier>,
    drafter: Arc<dyn ResponseDrafter>,
}

impl TicketProcessor {
    pub fn new(
        tickets: TicketService,
        classifier: Arc<dyn TicketClassifier>,
        drafter: Arc<dyn ResponseDrafter>,
    ) -> Self {
        Self { tickets, classifier, drafter }
    }

    /// Process one ticket. A missing ticket is fatal and the job is
    /// abandoned; any later failure reverts the status before the error is
    /// returned to the job runner.
    pub async fn process(&self, ticket_id: Uuid) -> ApiResult<()> {
        tracing::info!("Processing ticket {}", ticket_id);

        let ticket = self
            .tickets
            .get(ticket_id)
            .await?
            .ok_or(ApiError::TicketNotFound { ticket_id })?;

        self.tickets.set_status(ticket_id, TicketStatus::Processing).await?;
        tracing::info!("Set ticket {} status to processing", ticket_id);

        // Classification and drafting share no state; run them concurrently
        // and join before persisting anything.
        let outcome = tokio::try_join!(
            self.classifier.classify(&ticket.subject, &ticket.body),
            self.drafter.draft(&ticket.subject, &ticket.body),
        );

        let attempt = match outcome {
            Ok((classification, reply)) => {
                self.tickets
                    .complete(ticket_id, &classification, &reply, Utc::now())
                    .await
            },
            Err(e) => Err(e),
        };

        match attempt {
            Ok(()) => {
                tracing::info!("Processed ticket {}", ticket_id);
                Ok(())
            },
            Err(cause) => {
                tracing::error!("Processing ticket {} failed: {}", ticket_id, cause);
                // Revert so the ticket is visible to a future retrigger. A
                // failed revert write is itself fatal and takes precedence.
                match self.tickets.set_status(ticket_id, TicketStatus::Submitted).await {
                    Ok(()) => {
                        tracing::info!("Reverted ticket {} to submitted", ticket_id);
                        Err(cause)
                    },
                    Err(revert_err) => {
                        tracing::error!(
                            "Failed to revert ticket {} to submitted: {}",
                            ticket_id,
                            revert_err
                        );
                        Err(revert_err)
                    },
                }
            },
        }
    }

    /// Process a batch in order, continuing past per-ticket failures.
    /// Failed tickets are back in `submitted` and will be picked up by the
    /// next bulk trigger. Returns (succeeded, failed).
    pub async fn process_batch(&self, ticket_ids: &[Uuid]) -> (usize, usize) {
        let mut succeeded = 0;
        let mut failed = 0;

        for &ticket_id in ticket_ids {
            match self.process(ticket_id).await {
                Ok(()) => succeeded += 1,
                Err(e) => {
                    failed += 1;
                    tracing::error!("Batch item {} failed: {}", ticket_id, e);
                },
            }
        }

        (succeeded, failed)
    }
}

/// Queue consumer loop for the worker process. Pops one job per dequeue and
/// executes it; worker concurrency is a deployment concern (run more worker
/// processes), not enforced here.
pub struct JobConsumer {
    queue: RedisJobQueue,
    processor: TicketProcessor,
}

impl JobConsumer {
    pub fn new(queue: RedisJobQueue, processor: TicketProcessor) -> Self {
        Self { queue, processor }
    }

    pub async fn run(&self) {
        tracing::info!("Worker started, waiting for jobs");

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Worker shutting down");
                    break;
                },
                popped = self.queue.pop(POP_TIMEOUT_SECS) => match popped {
                    Ok(Some(job)) => self.handle(job).await,
                    Ok(None) => {},
                    Err(e) => {
                        tracing::error!("Queue poll failed: {}; retrying", e);
                        tokio::time::sleep(BROKER_RETRY_DELAY).await;
                    },
                },
            }
        }
    }

    async fn handle(&self, job: Job) {
        match job.payload {
            JobPayload::ProcessTicket { ticket_id } => {
                if let Err(e) = self.processor.process(ticket_id).await {
                    tracing::error!("Job {} failed: {}", job.job_id, e);
                }
            },
            JobPayload::ProcessBatch { ticket_ids } => {
                tracing::info!("Job {}: processing batch of {}", job.job_id, ticket_ids.len());
                let (succeeded, failed) = self.processor.process_batch(&ticket_ids).await;
                tracing::info!(
                    "Job {} finished: {} processed, {} failed",
                    job.job_id,
                    succeeded,
                    failed
                );
            },
        }
    }
}
