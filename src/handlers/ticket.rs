use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    CreateTicketRequest, ListTicketsQuery, PaginatedTickets, ProcessAccepted, Ticket,
    TicketCreated, TicketStatus,
};
use crate::services::ticket_service::MAX_PER_PAGE;
use crate::utils::{ApiError, ApiResult};
use crate::AppState;

/// Create a ticket and queue it for background processing.
#[utoipa::path(
    post,
    path = "/v1/ticket",
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket created", body = TicketCreated),
        (status = 422, description = "Invalid request body"),
    ),
    tag = "Tickets"
)]
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateTicketRequest>,
) -> ApiResult<(StatusCode, Json<TicketCreated>)> {
    payload
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let ticket = Ticket::new(payload.subject, payload.body, payload.customer_email);
    state.tickets.save(&ticket).await?;
    state.dispatcher.enqueue(ticket.id).await?;

    tracing::info!("Created ticket {} and queued it for processing", ticket.id);

    Ok((
        StatusCode::CREATED,
        Json(TicketCreated {
            ticket_id: ticket.id,
            status: TicketStatus::Submitted,
            message: "Ticket submitted successfully and queued for processing".to_string(),
        }),
    ))
}

/// Fetch a single ticket by id.
#[utoipa::path(
    get,
    path = "/v1/ticket/{ticket_id}",
    params(("ticket_id" = Uuid, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Ticket detail", body = Ticket),
        (status = 404, description = "Ticket not found"),
    ),
    tag = "Tickets"
)]
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<Uuid>,
) -> ApiResult<Json<Ticket>> {
    tracing::debug!("Fetching ticket {}", ticket_id);
    state
        .tickets
        .get(ticket_id)
        .await?
        .map(Json)
        .ok_or(ApiError::TicketNotFound { ticket_id })
}

/// Filter tickets by status, category and priority with pagination.
#[utoipa::path(
    get,
    path = "/v1/tickets",
    params(ListTicketsQuery),
    responses(
        (status = 200, description = "Page of tickets", body = PaginatedTickets),
        (status = 422, description = "Pagination out of range"),
    ),
    tag = "Tickets"
)]
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListTicketsQuery>, QueryRejection>,
) -> ApiResult<Json<PaginatedTickets>> {
    // Malformed query strings keep the `{"detail"}` error shape
    let Query(query) = query.map_err(|e| ApiError::validation(e.body_text()))?;

    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(MAX_PER_PAGE);

    let tickets = state
        .tickets
        .filter(page, per_page, query.status, query.category, query.priority)
        .await?;

    Ok(Json(PaginatedTickets { total: tickets.len(), tickets, page, per_page }))
}

/// Manually trigger processing of every submitted ticket as one batch job.
#[utoipa::path(
    post,
    path = "/v1/process",
    responses(
        (status = 200, description = "Batch job enqueued", body = ProcessAccepted),
        (status = 404, description = "No submitted tickets"),
    ),
    tag = "Tickets"
)]
pub async fn process_tickets(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ProcessAccepted>> {
    let pending = state.tickets.filter_by_status(TicketStatus::Submitted).await?;
    if pending.is_empty() {
        return Err(ApiError::EmptyBatch);
    }

    let ticket_ids: Vec<Uuid> = pending.iter().map(|t| t.id).collect();
    let handle = state.dispatcher.enqueue_many(ticket_ids).await?;

    tracing::info!("Enqueued batch job {} for {} tickets", handle.job_id, pending.len());

    Ok(Json(ProcessAccepted {
        message: format!("Processing started for {} tickets", pending.len()),
        job_id: handle.job_id,
    }))
}
