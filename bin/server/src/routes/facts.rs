//! Fact review endpoints.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use std::sync::Arc;
use ticketbot_core::FactId;
use ticketbot_facts::{Fact, NewFact};

/// Body of `GET /facts`.
#[derive(Debug, Serialize)]
pub struct FactsResponse {
    pub facts: Vec<Fact>,
}

/// Body of single-fact responses.
#[derive(Debug, Serialize)]
pub struct FactResponse {
    pub fact: Fact,
}

/// Lists saved facts.
pub async fn list_facts(State(state): State<Arc<AppState>>) -> Json<FactsResponse> {
    let facts = state.facts.list_saved().await;
    Json(FactsResponse { facts })
}

/// Records a pending fact extracted by the assistant.
pub async fn record_fact(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<FactResponse>), ApiError> {
    let draft: NewFact = serde_json::from_slice(&body).map_err(|e| ApiError::InvalidBody {
        reason: e.to_string(),
    })?;
    let fact = state.facts.record(draft).await?;
    tracing::info!(fact_id = %fact.id, "fact recorded");
    Ok((StatusCode::CREATED, Json(FactResponse { fact })))
}

/// Marks a fact as saved.
pub async fn save_fact(
    State(state): State<Arc<AppState>>,
    Path(fact_id): Path<String>,
) -> Result<Json<FactResponse>, ApiError> {
    let id = parse_fact_id(fact_id)?;
    let fact = state
        .facts
        .mark_saved(&id)
        .await
        .ok_or_else(|| ApiError::FactNotFound { id: id.to_string() })?;
    Ok(Json(FactResponse { fact }))
}

/// Marks a fact as discarded.
pub async fn discard_fact(
    State(state): State<Arc<AppState>>,
    Path(fact_id): Path<String>,
) -> Result<Json<FactResponse>, ApiError> {
    let id = parse_fact_id(fact_id)?;
    let fact = state
        .facts
        .discard(&id)
        .await
        .ok_or_else(|| ApiError::FactNotFound { id: id.to_string() })?;
    Ok(Json(FactResponse { fact }))
}

fn parse_fact_id(raw: String) -> Result<FactId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::FactNotFound { id: raw.clone() })
}
