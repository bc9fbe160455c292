//! HTTP routes.
//!
//! | Method & path               | Handler                        |
//! |-----------------------------|--------------------------------|
//! | `POST /chatkit`             | [`chatkit::chatkit`]           |
//! | `GET /facts`                | [`facts::list_facts`]          |
//! | `POST /facts`               | [`facts::record_fact`]         |
//! | `POST /facts/{id}/save`     | [`facts::save_fact`]           |
//! | `POST /facts/{id}/discard`  | [`facts::discard_fact`]        |
//! | `GET /health`               | [`health`]                     |
//! | `POST /api/chatkit/session` | [`session::create_session`]    |

pub mod chatkit;
pub mod facts;
pub mod session;

use crate::state::AppState;
use axum::{
    Json, Router,
    http::HeaderValue,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chatkit", post(chatkit::chatkit))
        .route("/facts", get(facts::list_facts).post(facts::record_fact))
        .route("/facts/{fact_id}/save", post(facts::save_fact))
        .route("/facts/{fact_id}/discard", post(facts::discard_fact))
        .route("/health", get(health))
        .route("/api/chatkit/session", post(session::create_session))
        .with_state(state)
}

/// Builds the full application: the router plus CORS and request tracing.
pub fn app(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    router(state)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// Builds the CORS policy.
///
/// Methods and headers are mirrored from the preflight request, which allows
/// all of them while remaining valid alongside credentials.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Body of `GET /health`.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Liveness check with no dependencies.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}
