use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// API error taxonomy.
///
/// Uses thiserror so each variant carries the context needed to debug it.
/// Classification/Drafting errors are fatal to the current job attempt and
/// trigger a status revert; they only reach HTTP responses if a handler ever
/// calls the LLM clients directly.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Ticket {ticket_id} not found")]
    TicketNotFound { ticket_id: Uuid },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Response drafting failed: {0}")]
    Drafting(String),

    #[error("No tickets remain to be processed")]
    EmptyBatch,

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint(message.into())
    }

    pub fn classification(message: impl Into<String>) -> Self {
        Self::Classification(message.into())
    }

    pub fn drafting(message: impl Into<String>) -> Self {
        Self::Drafting(message.into())
    }

    pub fn queue(message: impl Into<String>) -> Self {
        Self::Queue(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::TicketNotFound { .. } | Self::EmptyBatch => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Constraint(_) => StatusCode::CONFLICT,
            Self::Classification(_)
            | Self::Drafting(_)
            | Self::Queue(_)
            | Self::Database(_)
            | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// User-visible failures are JSON bodies with a `detail` field.
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = ApiErrorResponse { detail: self.to_string() };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
