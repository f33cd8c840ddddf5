//! Router construction and shared state.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::chat;
use crate::chat::ChatService;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ChatService>,
    /// Status used for failed chat calls
    pub error_status: StatusCode,
}

impl AppState {
    pub fn new(service: Arc<ChatService>, error_status: u16) -> Self {
        Self {
            service,
            error_status: StatusCode::from_u16(error_status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

/// Build the HTTP router.
pub fn router(state: AppState, cors_allow_credentials: bool) -> Router {
    Router::new()
        .route("/api/chat", post(chat::chat))
        .route("/health", get(chat::health))
        .layer(cors_layer(cors_allow_credentials))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Permit every origin, method and header.
///
/// Wildcards are invalid alongside credentials, so credentialed mode mirrors
/// the request instead.
fn cors_layer(allow_credentials: bool) -> CorsLayer {
    if allow_credentials {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(Any)
    }
}
