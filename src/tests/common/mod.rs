// Common test utilities and stubs

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use uuid::Uuid;

use crate::models::{Classification, Ticket, TicketCategory, TicketPriority};
use crate::services::llm::{ResponseDrafter, TicketClassifier};
use crate::services::queue::{JobDispatcher, JobHandle};
use crate::services::TicketService;
use crate::utils::{ApiError, ApiResult};
use crate::{build_router, AppState};

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(3))
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Save a fresh ticket with the given subject and return it
pub async fn seed_ticket(tickets: &TicketService, subject: &str) -> Ticket {
    let ticket = Ticket::new(subject.to_string(), "body".to_string(), "a@b.com".to_string());
    tickets.save(&ticket).await.expect("Failed to seed ticket");
    ticket
}

pub fn sample_classification() -> Classification {
    Classification {
        category: TicketCategory::AccountAccess,
        priority: TicketPriority::High,
        category_confidence: 0.92,
        priority_confidence: 0.85,
    }
}

/// Dispatcher stub that records dispatched ids instead of talking to a broker
#[derive(Default)]
pub struct RecordingDispatcher {
    pub single: Mutex<Vec<Uuid>>,
    pub batches: Mutex<Vec<Vec<Uuid>>>,
}

#[async_trait]
impl JobDispatcher for RecordingDispatcher {
    async fn enqueue(&self, ticket_id: Uuid) -> ApiResult<JobHandle> {
        self.single.lock().unwrap().push(ticket_id);
        Ok(JobHandle { job_id: Uuid::new_v4() })
    }

    async fn enqueue_many(&self, ticket_ids: Vec<Uuid>) -> ApiResult<JobHandle> {
        self.batches.lock().unwrap().push(ticket_ids);
        Ok(JobHandle { job_id: Uuid::new_v4() })
    }
}

/// Classifier stub: `Some` succeeds with that classification, `None` fails
pub struct StubClassifier {
    pub result: Option<Classification>,
}

#[async_trait]
impl TicketClassifier for StubClassifier {
    async fn classify(&self, _subject: &str, _body: &str) -> ApiResult<Classification> {
        self.result
            .clone()
            .ok_or_else(|| ApiError::classification("stub classifier failure"))
    }
}

/// Drafter stub: `Some` succeeds with that reply, `None` fails
pub struct StubDrafter {
    pub result: Option<String>,
}

#[async_trait]
impl ResponseDrafter for StubDrafter {
    async fn draft(&self, _subject: &str, _body: &str) -> ApiResult<String> {
        self.result
            .clone()
            .ok_or_else(|| ApiError::drafting("stub drafter failure"))
    }
}

/// Build a router over a recording dispatcher, returning both
pub fn test_app(pool: SqlitePool) -> (Router, Arc<RecordingDispatcher>) {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let state = Arc::new(AppState {
        tickets: TicketService::new(pool),
        dispatcher: dispatcher.clone(),
    });
    (build_router(state), dispatcher)
}
