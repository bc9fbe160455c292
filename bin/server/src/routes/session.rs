//! Hosted session endpoint.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{Json, body::Bytes, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ticketbot_core::WorkflowId;

/// Optional body of `POST /api/chatkit/session`.
#[derive(Debug, Default, Deserialize)]
struct SessionRequest {
    #[serde(default)]
    workflow_id: Option<String>,
}

/// Body of a successful session response.
#[derive(Serialize)]
pub struct SessionResponse {
    pub client_secret: String,
}

/// Creates a hosted ChatKit session and returns its client secret.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SessionResponse>, ApiError> {
    let workflow_id = requested_workflow(&body)?.unwrap_or_else(|| state.workflow_id.clone());

    let secret = state.session_issuer.create_session(&workflow_id).await?;

    tracing::info!(%workflow_id, "issued ChatKit session");
    Ok(Json(SessionResponse {
        client_secret: secret.expose().to_string(),
    }))
}

fn requested_workflow(body: &[u8]) -> Result<Option<WorkflowId>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let request: SessionRequest =
        serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody {
            reason: e.to_string(),
        })?;

    request
        .workflow_id
        .map(|raw| {
            raw.parse().map_err(|e: ticketbot_core::ParseIdError| {
                ApiError::InvalidBody {
                    reason: e.to_string(),
                }
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_uses_default_workflow() {
        assert!(requested_workflow(b"").unwrap().is_none());
        assert!(requested_workflow(b" \n").unwrap().is_none());
        assert!(requested_workflow(b"{}").unwrap().is_none());
    }

    #[test]
    fn body_can_name_workflow() {
        let id = requested_workflow(br#"{"workflow_id":"wf_other"}"#)
            .unwrap()
            .expect("workflow id");
        assert_eq!(id.as_str(), "wf_other");
    }

    #[test]
    fn blank_or_malformed_body_is_rejected() {
        assert!(matches!(
            requested_workflow(br#"{"workflow_id":"  "}"#),
            Err(ApiError::InvalidBody { .. })
        ));
        assert!(matches!(
            requested_workflow(b"not json"),
            Err(ApiError::InvalidBody { .. })
        ));
    }
}
