use axum::Json;

use crate::models::PingResponse;

/// Liveness probe outside the versioned prefix.
#[utoipa::path(
    get,
    path = "/ping",
    responses(
        (status = 200, description = "Service is up", body = PingResponse)
    ),
    tag = "Health"
)]
pub async fn root_ping() -> Json<PingResponse> {
    Json(PingResponse { status: "ok", message: "I'm up!" })
}

/// Versioned ping.
#[utoipa::path(
    get,
    path = "/v1/ping",
    responses(
        (status = 200, description = "API v1 is up", body = PingResponse)
    ),
    tag = "Health"
)]
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse { status: "ok", message: "pong" })
}
