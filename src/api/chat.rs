//! Chat and health handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::Instrument;
use uuid::Uuid;

use super::routes::AppState;
use super::types::{ChatRequest, ChatResponse, HealthResponse};

/// POST /api/chat - Answer a message, optionally within a session.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return invalid_request(rejection.body_text()),
    };
    if let Err(reason) = request.validate() {
        return invalid_request(reason);
    }

    let request_id = Uuid::new_v4();
    let session_id = request.session_id();
    let span = tracing::info_span!("chat", %request_id, session_id = session_id.unwrap_or("-"));

    match state
        .service
        .chat(&request.message, session_id)
        .instrument(span)
        .await
    {
        Ok(reply) => (StatusCode::OK, Json(ChatResponse::ok(reply))).into_response(),
        Err(e) => {
            let detail = error_chain(&e);
            tracing::error!(%request_id, "Error processing chat request: {}", detail);
            (
                state.error_status,
                Json(ChatResponse::failed(e.to_string(), detail)),
            )
                .into_response()
        }
    }
}

/// GET /health - Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

fn invalid_request(reason: String) -> Response {
    tracing::debug!("Rejected chat request: {}", reason);
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ChatResponse::failed(
            format!("Invalid request: {}", reason),
            reason,
        )),
    )
        .into_response()
}

/// Render an error and all of its sources as `outer: inner: ...`.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
