//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables
//! (`OPENAI_API_KEY` maps to `openai_api_key`, and so on).

use serde::Deserialize;
use std::time::Duration;
use ticketbot_chatkit::{HostedChatConfig, SessionIssuerConfig};
use ticketbot_core::WorkflowId;

/// Workflow used for sessions when `CHATKIT_WORKFLOW_ID` is unset.
pub const DEFAULT_WORKFLOW_ID: &str = "wf_68e6daaa077c8190ba4b536ae0ce309401143f1d8d969c22";

/// Origins allowed to call the API from a browser.
pub const DEFAULT_CORS_ALLOWED_ORIGINS: [&str; 3] = [
    "https://gatethegreat.github.io",
    "http://localhost:5170",
    "http://127.0.0.1:5170",
];

/// Server configuration.
#[derive(Clone, Deserialize)]
pub struct ServerConfig {
    /// API key for the hosted service.
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Base URL of the hosted API.
    #[serde(default = "default_openai_api_base")]
    pub openai_api_base: String,

    /// Workflow that sessions are created for.
    #[serde(default = "default_chatkit_workflow_id")]
    pub chatkit_workflow_id: String,

    /// Upstream ChatKit endpoint for `POST /chatkit`.
    /// The conversational endpoint is disabled while unset.
    #[serde(default)]
    pub chatkit_upstream_url: Option<String>,

    /// Address to listen on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Allowed CORS origins as a comma-separated string.
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: String,

    /// Timeout for calls to the hosted service, in seconds.
    #[serde(default)]
    pub http_timeout_seconds: Option<u64>,
}

fn default_openai_api_base() -> String {
    ticketbot_chatkit::session::DEFAULT_API_BASE.to_string()
}

fn default_chatkit_workflow_id() -> String {
    DEFAULT_WORKFLOW_ID.to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_cors_allowed_origins() -> String {
    DEFAULT_CORS_ALLOWED_ORIGINS.join(",")
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Returns the API key, if one is set.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        non_blank(&self.openai_api_key)
    }

    /// Returns the workflow id, falling back to the default when blank.
    #[must_use]
    pub fn workflow_id(&self) -> WorkflowId {
        self.chatkit_workflow_id
            .parse()
            .unwrap_or_else(|_| WorkflowId::new(DEFAULT_WORKFLOW_ID))
    }

    /// Returns the configured CORS origins.
    #[must_use]
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Returns the hosted-call timeout.
    #[must_use]
    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_seconds.map(Duration::from_secs)
    }

    /// Returns the conversation proxy configuration.
    ///
    /// `None` unless both the API key and the upstream URL are set.
    #[must_use]
    pub fn hosted_chat(&self) -> Option<HostedChatConfig> {
        let api_key = self.api_key()?;
        let upstream_url = non_blank(&self.chatkit_upstream_url)?;
        Some(HostedChatConfig {
            upstream_url: upstream_url.to_string(),
            api_key: api_key.to_string(),
            timeout: self.http_timeout(),
        })
    }

    /// Returns the session issuer configuration.
    #[must_use]
    pub fn session_issuer(&self) -> SessionIssuerConfig {
        SessionIssuerConfig {
            api_key: self.api_key().map(str::to_string),
            api_base: Some(self.openai_api_base.clone()),
            timeout: self.http_timeout(),
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("openai_api_key", &self.api_key().map(|_| "[redacted]"))
            .field("openai_api_base", &self.openai_api_base)
            .field("chatkit_workflow_id", &self.chatkit_workflow_id)
            .field("chatkit_upstream_url", &self.chatkit_upstream_url)
            .field("bind_addr", &self.bind_addr)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("http_timeout_seconds", &self.http_timeout_seconds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(overrides: &[(&str, &str)]) -> ServerConfig {
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
    fn defaults_apply_when_unset() {
        let config = load(&[]);

        assert!(config.api_key().is_none());
        assert_eq!(config.workflow_id().as_str(), DEFAULT_WORKFLOW_ID);
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.openai_api_base, "https://api.openai.com");
        assert_eq!(config.cors_origins(), DEFAULT_CORS_ALLOWED_ORIGINS.to_vec());
        assert!(config.http_timeout().is_none());
    }

    #[test]
    fn chat_proxy_requires_key_and_upstream() {
        let config = load(&[("openai_api_key", "sk-test")]);
        assert!(config.hosted_chat().is_none());

        let config = load(&[("chatkit_upstream_url", "https://chat.example.com/chatkit")]);
        assert!(config.hosted_chat().is_none());

        let config = load(&[
            ("openai_api_key", "sk-test"),
            ("chatkit_upstream_url", "https://chat.example.com/chatkit"),
        ]);
        let hosted = config.hosted_chat().expect("chat proxy configured");
        assert_eq!(hosted.upstream_url, "https://chat.example.com/chatkit");
        assert_eq!(hosted.api_key, "sk-test");
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = load(&[
            ("openai_api_key", "  "),
            ("chatkit_workflow_id", ""),
            ("chatkit_upstream_url", "https://chat.example.com/chatkit"),
        ]);

        assert!(config.api_key().is_none());
        assert!(config.hosted_chat().is_none());
        assert_eq!(config.workflow_id().as_str(), DEFAULT_WORKFLOW_ID);
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let config = load(&[(
            "cors_allowed_origins",
            "https://a.example.com, http://localhost:3000 ,,",
        )]);

        assert_eq!(
            config.cors_origins(),
            vec!["https://a.example.com", "http://localhost:3000"]
        );
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = load(&[("openai_api_key", "sk-very-secret")]);
        assert!(!format!("{config:?}").contains("sk-very-secret"));
    }
}
