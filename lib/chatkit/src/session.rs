//! Hosted ChatKit session issuance.
//!
//! A session binds a hosted workflow to an end user and yields a client
//! secret the front-end uses to talk to the hosted service directly.

use crate::error::SessionIssueError;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use ticketbot_core::{EndUserId, WorkflowId};
use tracing::{debug, instrument, warn};

/// Default API base for the hosted service.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com";

/// Path of the session creation endpoint, relative to the API base.
const SESSIONS_PATH: &str = "v1/chatkit/sessions";

/// Beta opt-in header required by the sessions API.
const BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "chatkit_beta=v1");

/// An opaque, short-lived credential for the ChatKit front-end.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientSecret(String);

impl ClientSecret {
    /// Wraps a secret string.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the secret for handing to the caller.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ClientSecret([redacted])")
    }
}

/// Trait for session issuers.
#[async_trait]
pub trait SessionIssuer: Send + Sync {
    /// Creates a session for `workflow_id` and returns its client secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the hosted call fails for any reason.
    async fn create_session(
        &self,
        workflow_id: &WorkflowId,
    ) -> ticketbot_core::Result<ClientSecret, SessionIssueError>;
}

/// Configuration for [`OpenAiSessionIssuer`].
#[derive(Clone, Default)]
pub struct SessionIssuerConfig {
    /// API key; session creation fails while unset.
    pub api_key: Option<String>,
    /// API base URL; [`DEFAULT_API_BASE`] when unset.
    pub api_base: Option<String>,
    /// Overall request timeout; reqwest's default applies when unset.
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for SessionIssuerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIssuerConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct CreateSessionRequest<'a> {
    workflow: WorkflowRef<'a>,
    user: &'a str,
}

#[derive(Debug, Serialize)]
struct WorkflowRef<'a> {
    id: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateSessionResponse {
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Issues sessions through the hosted ChatKit sessions API.
pub struct OpenAiSessionIssuer {
    client: Client,
    sessions_url: Url,
    api_key: Option<String>,
}

impl OpenAiSessionIssuer {
    /// Creates an issuer.
    ///
    /// A missing API key is not an error here; it is reported on each
    /// session request instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the API base is not a valid URL or the HTTP
    /// client cannot be built.
    pub fn new(config: SessionIssuerConfig) -> ticketbot_core::Result<Self, SessionIssueError> {
        let api_base = config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
        let sessions_url = Url::parse(&format!("{}/", api_base.trim_end_matches('/')))
            .and_then(|base| base.join(SESSIONS_PATH))
            .map_err(|e| SessionIssueError::InvalidConfig {
                reason: format!("invalid API base '{api_base}': {e}"),
            })?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SessionIssueError::InvalidConfig {
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            sessions_url,
            api_key: config.api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    /// Returns the session creation endpoint.
    #[must_use]
    pub fn sessions_url(&self) -> &Url {
        &self.sessions_url
    }
}

fn rejection_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait]
impl SessionIssuer for OpenAiSessionIssuer {
    #[instrument(skip_all, fields(workflow_id = %workflow_id))]
    async fn create_session(
        &self,
        workflow_id: &WorkflowId,
    ) -> ticketbot_core::Result<ClientSecret, SessionIssueError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SessionIssueError::MissingApiKey)?;

        let user = EndUserId::generate();
        let request = CreateSessionRequest {
            workflow: WorkflowRef {
                id: workflow_id.as_str(),
            },
            user: user.as_str(),
        };

        let response = self
            .client
            .post(self.sessions_url.clone())
            .bearer_auth(api_key)
            .header(BETA_HEADER.0, BETA_HEADER.1)
            .json(&request)
            .send()
            .await
            .map_err(|e| SessionIssueError::RequestFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SessionIssueError::RequestFailed {
                reason: e.to_string(),
            })?;

        if !status.is_success() {
            let message = rejection_message(&body);
            warn!(status = status.as_u16(), %message, "session creation rejected");
            return Err(SessionIssueError::Rejected {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let parsed: CreateSessionResponse =
            serde_json::from_str(&body).map_err(|e| SessionIssueError::MalformedResponse {
                reason: e.to_string(),
            })?;
        let secret = parsed
            .client_secret
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| SessionIssueError::MalformedResponse {
                reason: "missing client_secret".to_string(),
            })?;

        debug!(user = %user, "created ChatKit session");
        Ok(ClientSecret::new(secret))
    }
}
