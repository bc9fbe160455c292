//! Conversation proxy endpoint.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{
        HeaderMap,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use ticketbot_chatkit::{ChatResult, RequestContext};

/// Forwards a ChatKit request and relays the result.
///
/// Streaming results are sent as `text/event-stream`, chunk by chunk;
/// buffered results as `application/json`.
pub async fn chatkit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let server = state.chat_server()?;

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let context = RequestContext::new(content_type);
    let request_id = context.request_id.clone();

    let response = match server.process(body, context).await? {
        ChatResult::Streaming(chunks) => {
            tracing::debug!(%request_id, "streaming ChatKit response");
            (
                [
                    (CONTENT_TYPE, "text/event-stream"),
                    (CACHE_CONTROL, "no-cache"),
                ],
                Body::from_stream(chunks),
            )
                .into_response()
        }
        ChatResult::Buffered(payload) => {
            tracing::debug!(%request_id, bytes = payload.len(), "buffered ChatKit response");
            ([(CONTENT_TYPE, "application/json")], payload).into_response()
        }
    };

    Ok(response)
}
