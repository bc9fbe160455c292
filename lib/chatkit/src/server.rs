//! Conversation server abstraction.
//!
//! A [`ChatServer`] accepts the raw ChatKit request body and produces either a
//! stream of server-sent-event chunks or one complete JSON payload. The
//! payload is never interpreted here.

use crate::error::ChatError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use ulid::Ulid;

/// Incrementally produced response chunks.
///
/// Dropping the stream releases the underlying connection.
pub type ChunkStream = BoxStream<'static, Result<Bytes, ChatError>>;

/// The result of processing a ChatKit request.
pub enum ChatResult {
    /// Chunks to forward as `text/event-stream`.
    Streaming(ChunkStream),
    /// A complete JSON document.
    Buffered(Bytes),
}

impl ChatResult {
    /// Returns true for a streaming result.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming(_))
    }
}

impl std::fmt::Debug for ChatResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Streaming(_) => f.write_str("ChatResult::Streaming(..)"),
            Self::Buffered(body) => f
                .debug_tuple("ChatResult::Buffered")
                .field(&body.len())
                .finish(),
        }
    }
}

/// Per-request information passed alongside the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Correlation id for logs and the upstream request.
    pub request_id: String,
    /// Content type of the inbound body, if the caller sent one.
    pub content_type: Option<String>,
}

impl RequestContext {
    /// Creates a context with a fresh request id.
    #[must_use]
    pub fn new(content_type: Option<String>) -> Self {
        Self {
            request_id: Ulid::new().to_string(),
            content_type,
        }
    }
}

/// Trait for conversation servers.
#[async_trait]
pub trait ChatServer: Send + Sync {
    /// Processes one ChatKit request.
    ///
    /// # Errors
    ///
    /// Returns an error if the hosted service cannot be reached or rejects
    /// the request.
    async fn process(
        &self,
        payload: Bytes,
        context: RequestContext,
    ) -> ticketbot_core::Result<ChatResult, ChatError>;
}
