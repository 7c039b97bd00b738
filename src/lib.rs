pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use services::{JobDispatcher, TicketService};

/// Shared state handed to every request handler.
///
/// Constructed once at startup and passed in explicitly; the dispatcher and
/// store are process-wide dependencies, not ambient globals.
pub struct AppState {
    pub tickets: TicketService,
    pub dispatcher: Arc<dyn JobDispatcher>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::root_ping,
        handlers::health::ping,
        handlers::ticket::create_ticket,
        handlers::ticket::get_ticket,
        handlers::ticket::list_tickets,
        handlers::ticket::process_tickets,
    ),
    components(schemas(
        models::Ticket,
        models::TicketStatus,
        models::TicketCategory,
        models::TicketPriority,
        models::CreateTicketRequest,
        models::TicketCreated,
        models::PaginatedTickets,
        models::ProcessAccepted,
        models::PingResponse,
        models::Classification,
    )),
    tags(
        (name = "Tickets", description = "Ticket intake, lookup and processing"),
        (name = "Health", description = "Liveness probes")
    )
)]
pub struct ApiDoc;

/// Build the HTTP surface over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(handlers::health::root_ping))
        .route("/v1/ping", get(handlers::health::ping))
        .route("/v1/ticket", post(handlers::ticket::create_ticket))
        .route("/v1/ticket/:ticket_id", get(handlers::ticket::get_ticket))
        .route("/v1/tickets", get(handlers::ticket::list_tickets))
        .route("/v1/process", post(handlers::ticket::process_tickets))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
