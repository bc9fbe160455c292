//! Conversation server backed by a hosted ChatKit endpoint.

use crate::error::ChatError;
use crate::server::{ChatResult, ChatServer, RequestContext};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Header carrying the per-request correlation id upstream.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Configuration for [`HostedChatServer`].
#[derive(Clone)]
pub struct HostedChatConfig {
    /// Full URL of the upstream ChatKit endpoint.
    pub upstream_url: String,
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Overall request timeout; reqwest's default applies when unset.
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for HostedChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedChatConfig")
            .field("upstream_url", &self.upstream_url)
            .field("api_key", &"[redacted]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Forwards ChatKit requests to a hosted endpoint.
pub struct HostedChatServer {
    client: Client,
    upstream_url: Url,
    api_key: String,
}

impl HostedChatServer {
    /// Creates a server for the configured upstream.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: HostedChatConfig) -> ticketbot_core::Result<Self, ChatError> {
        let upstream_url =
            Url::parse(config.upstream_url.trim()).map_err(|e| ChatError::InvalidConfig {
                reason: format!("invalid upstream URL '{}': {e}", config.upstream_url),
            })?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ChatError::InvalidConfig {
            reason: format!("failed to create HTTP client: {e}"),
        })?;

        Ok(Self {
            client,
            upstream_url,
            api_key: config.api_key,
        })
    }

    /// Returns the upstream endpoint.
    #[must_use]
    pub fn upstream_url(&self) -> &Url {
        &self.upstream_url
    }
}

fn is_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase().contains("text/event-stream"))
        .unwrap_or(false)
}

#[async_trait]
impl ChatServer for HostedChatServer {
    #[instrument(skip_all, fields(request_id = %context.request_id))]
    async fn process(
        &self,
        payload: Bytes,
        context: RequestContext,
    ) -> ticketbot_core::Result<ChatResult, ChatError> {
        let content_type = context
            .content_type
            .as_deref()
            .unwrap_or("application/json");

        let response = self
            .client
            .post(self.upstream_url.clone())
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, content_type)
            .header(REQUEST_ID_HEADER, context.request_id.as_str())
            .body(payload)
            .send()
            .await
            .map_err(|e| ChatError::RequestFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(error = %e, "failed to read upstream error body");
                    String::new()
                }
            };
            warn!(status = status.as_u16(), "ChatKit upstream rejected request");
            return Err(ChatError::UpstreamStatus {
                status: status.as_u16(),
                body: body.trim().to_string(),
            }
            .into());
        }

        if is_event_stream(response.headers()) {
            debug!("forwarding streaming response");
            let chunks = response
                .bytes_stream()
                .map(|chunk| {
                    chunk.map_err(|e| ChatError::StreamInterrupted {
                        reason: e.to_string(),
                    })
                })
                .boxed();
            return Ok(ChatResult::Streaming(chunks));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ChatError::RequestFailed {
                reason: e.to_string(),
            })?;
        debug!(bytes = body.len(), "forwarding buffered response");
        Ok(ChatResult::Buffered(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn server_for(mock: &MockServer) -> HostedChatServer {
        HostedChatServer::new(HostedChatConfig {
            upstream_url: mock.url("/chatkit"),
            api_key: "sk-test".to_string(),
            timeout: Some(Duration::from_secs(5)),
        })
        .expect("build server")
    }

    async fn collect(result: ChatResult) -> Vec<u8> {
        match result {
            ChatResult::Streaming(mut chunks) => {
                let mut body = Vec::new();
                while let Some(chunk) = chunks.next().await {
                    body.extend_from_slice(&chunk.expect("chunk"));
                }
                body
            }
            ChatResult::Buffered(_) => panic!("expected streaming result"),
        }
    }

    #[tokio::test]
    async fn buffered_response_is_passed_through() {
        let upstream = MockServer::start_async().await;
        let forwarded = upstream.mock(|when, then| {
            when.method(POST)
                .path("/chatkit")
                .header("authorization", "Bearer sk-test")
                .header("content-type", "application/json")
                .header_exists("x-request-id")
                .body(r#"{"type":"threads.list"}"#);
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"data":[],"has_more":false}"#);
        });

        let result = server_for(&upstream)
            .process(
                Bytes::from_static(br#"{"type":"threads.list"}"#),
                RequestContext::new(Some("application/json".to_string())),
            )
            .await
            .expect("process");

        forwarded.assert();
        match result {
            ChatResult::Buffered(body) => {
                assert_eq!(&body[..], br#"{"data":[],"has_more":false}"#);
            }
            ChatResult::Streaming(_) => panic!("expected buffered result"),
        }
    }

    #[tokio::test]
    async fn event_stream_response_is_streamed() {
        let upstream = MockServer::start_async().await;
        upstream.mock(|when, then| {
            when.method(POST).path("/chatkit");
            then.status(200)
                .header("content-type", "text/event-stream; charset=utf-8")
                .body("data: {\"type\":\"thread.created\"}\n\ndata: {\"type\":\"done\"}\n\n");
        });

        let result = server_for(&upstream)
            .process(
                Bytes::from_static(br#"{"type":"threads.create"}"#),
                RequestContext::new(None),
            )
            .await
            .expect("process");

        assert!(result.is_streaming());
        let body = collect(result).await;
        assert_eq!(
            String::from_utf8(body).expect("utf-8"),
            "data: {\"type\":\"thread.created\"}\n\ndata: {\"type\":\"done\"}\n\n"
        );
    }

    #[tokio::test]
    async fn upstream_error_status_is_reported() {
        let upstream = MockServer::start_async().await;
        upstream.mock(|when, then| {
            when.method(POST).path("/chatkit");
            then.status(401).body("invalid api key\n");
        });

        let err = server_for(&upstream)
            .process(Bytes::from_static(b"{}"), RequestContext::new(None))
            .await
            .unwrap_err();

        assert_eq!(
            err.current_context(),
            &ChatError::UpstreamStatus {
                status: 401,
                body: "invalid api key".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn upstream_error_without_body_keeps_status() {
        let upstream = MockServer::start_async().await;
        upstream.mock(|when, then| {
            when.method(POST).path("/chatkit");
            then.status(502);
        });

        let err = server_for(&upstream)
            .process(Bytes::from_static(b"{}"), RequestContext::new(None))
            .await
            .unwrap_err();

        assert_eq!(
            err.current_context(),
            &ChatError::UpstreamStatus {
                status: 502,
                body: String::new(),
            }
        );
    }

    #[test]
    fn invalid_upstream_url_is_rejected() {
        let result = HostedChatServer::new(HostedChatConfig {
            upstream_url: "not a url".to_string(),
            api_key: "sk-test".to_string(),
            timeout: None,
        });

        let err = result.err().expect("should fail");
        assert!(matches!(
            err.current_context(),
            ChatError::InvalidConfig { .. }
        ));
    }

    #[test]
    fn config_debug_redacts_key() {
        let config = HostedChatConfig {
            upstream_url: "https://chat.example.com/chatkit".to_string(),
            api_key: "sk-secret".to_string(),
            timeout: None,
        };
        assert!(!format!("{config:?}").contains("sk-secret"));
    }
}
