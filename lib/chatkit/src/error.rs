//! Error types for the ChatKit crate.
//!
//! - `ChatError`: failures forwarding a conversation request
//! - `SessionIssueError`: failures creating a hosted ChatKit session
//!
//! Messages are surfaced to HTTP callers, so they never include credentials.

use std::fmt;

/// Errors from the conversation proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// The request could not be sent or the response could not be read.
    RequestFailed { reason: String },
    /// The hosted service answered with a non-success status.
    UpstreamStatus { status: u16, body: String },
    /// The upstream stream broke after it started.
    StreamInterrupted { reason: String },
    /// Invalid configuration.
    InvalidConfig { reason: String },
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { reason } => {
                write!(f, "ChatKit request failed: {reason}")
            }
            Self::UpstreamStatus { status, body } => {
                if body.is_empty() {
                    write!(f, "ChatKit service returned status {status}")
                } else {
                    write!(f, "ChatKit service returned status {status}: {body}")
                }
            }
            Self::StreamInterrupted { reason } => {
                write!(f, "ChatKit stream interrupted: {reason}")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid ChatKit configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for ChatError {}

/// Errors from hosted session creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionIssueError {
    /// No API key is configured.
    MissingApiKey,
    /// The request could not be sent or the response could not be read.
    RequestFailed { reason: String },
    /// The hosted service refused the request.
    Rejected { status: u16, message: String },
    /// The response did not contain a client secret.
    MalformedResponse { reason: String },
    /// Invalid configuration.
    InvalidConfig { reason: String },
}

impl fmt::Display for SessionIssueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "OPENAI_API_KEY is not configured"),
            Self::RequestFailed { reason } => write!(f, "request failed: {reason}"),
            Self::Rejected { status, message } => {
                write!(f, "hosted service returned status {status}: {message}")
            }
            Self::MalformedResponse { reason } => {
                write!(f, "malformed session response: {reason}")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid session issuer configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for SessionIssueError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_display() {
        let err = ChatError::UpstreamStatus {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ChatKit service returned status 502: bad gateway"
        );

        let err = ChatError::UpstreamStatus {
            status: 500,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "ChatKit service returned status 500");
    }

    #[test]
    fn rejected_display_includes_message() {
        let err = SessionIssueError::Rejected {
            status: 400,
            message: "Invalid workflow id".to_string(),
        };
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("Invalid workflow id"));
    }
}
