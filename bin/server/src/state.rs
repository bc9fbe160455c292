//! Shared application state.

use crate::config::ServerConfig;
use crate::error::ApiError;
use std::sync::Arc;
use ticketbot_chatkit::{
    ChatServer, HostedChatServer, OpenAiSessionIssuer, SessionIssueError, SessionIssuer,
};
use ticketbot_core::WorkflowId;
use ticketbot_facts::{FactStore, InMemoryFactStore};

/// State injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Facts extracted from conversations.
    pub facts: Arc<dyn FactStore>,
    /// Conversation server; `None` when ChatKit is not configured.
    pub chat_server: Option<Arc<dyn ChatServer>>,
    /// Hosted session issuer.
    pub session_issuer: Arc<dyn SessionIssuer>,
    /// Workflow used when a session request does not name one.
    pub workflow_id: WorkflowId,
}

impl AppState {
    /// Creates state without a conversation server.
    pub fn new(
        facts: Arc<dyn FactStore>,
        session_issuer: Arc<dyn SessionIssuer>,
        workflow_id: WorkflowId,
    ) -> Self {
        Self {
            facts,
            chat_server: None,
            session_issuer,
            workflow_id,
        }
    }

    /// Sets the conversation server.
    #[must_use]
    pub fn with_chat_server(mut self, chat_server: Arc<dyn ChatServer>) -> Self {
        self.chat_server = Some(chat_server);
        self
    }

    /// Builds production state from configuration.
    ///
    /// A missing or invalid ChatKit upstream only disables `POST /chatkit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session issuer cannot be built.
    pub fn from_config(config: &ServerConfig) -> ticketbot_core::Result<Self, SessionIssueError> {
        let session_issuer = OpenAiSessionIssuer::new(config.session_issuer())?;
        if config.api_key().is_none() {
            tracing::warn!("OPENAI_API_KEY is not set; session creation will fail");
        }

        let state = Self::new(
            Arc::new(InMemoryFactStore::new()),
            Arc::new(session_issuer),
            config.workflow_id(),
        );

        let Some(hosted) = config.hosted_chat() else {
            tracing::warn!("ChatKit upstream not configured; POST /chatkit will return 503");
            return Ok(state);
        };

        match HostedChatServer::new(hosted) {
            Ok(server) => {
                tracing::info!(upstream = %server.upstream_url(), "ChatKit proxy enabled");
                Ok(state.with_chat_server(Arc::new(server)))
            }
            Err(report) => {
                tracing::error!(
                    error = %report.current_context(),
                    "ChatKit proxy disabled; POST /chatkit will return 503"
                );
                Ok(state)
            }
        }
    }

    /// Returns the conversation server or the unavailable error.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ChatUnavailable`] when none is configured.
    pub fn chat_server(&self) -> Result<&Arc<dyn ChatServer>, ApiError> {
        self.chat_server.as_ref().ok_or(ApiError::ChatUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_config(overrides: &[(&str, &str)]) -> ServerConfig {
        let mut builder = config::Config::builder();
        for (key, value) in overrides {
            builder = builder
                .set_override(*key, *value)
                .expect("set override");
        }
        builder
            .build()
            .expect("build config")
            .try_deserialize()
            .expect("deserialize config")
    }

    #[test]
    fn chat_server_absent_without_upstream() {
        let state = AppState::from_config(&load_config(&[("openai_api_key", "sk-test")]))
            .expect("build state");

        assert!(matches!(
            state.chat_server(),
            Err(ApiError::ChatUnavailable)
        ));
    }

    #[test]
    fn chat_server_present_when_configured() {
        let state = AppState::from_config(&load_config(&[
            ("openai_api_key", "sk-test"),
            ("chatkit_upstream_url", "https://chat.example.com/chatkit"),
        ]))
        .expect("build state");

        assert!(state.chat_server().is_ok());
    }

    #[test]
    fn invalid_upstream_disables_chat() {
        let state = AppState::from_config(&load_config(&[
            ("openai_api_key", "sk-test"),
            ("chatkit_upstream_url", "::not-a-url::"),
        ]))
        .expect("build state");

        assert!(state.chat_server().is_err());
    }

    #[test]
    fn invalid_api_base_fails_startup() {
        let result = AppState::from_config(&load_config(&[("openai_api_base", "not a url")]));
        assert!(result.is_err());
    }
}
