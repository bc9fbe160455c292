//! HTTP error mapping.
//!
//! Every failure is converted to a status code exactly once, here. Error
//! bodies have the shape `{"detail": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rootcause::Report;
use serde::Serialize;
use std::fmt;
use ticketbot_chatkit::{ChatError, SessionIssueError};
use ticketbot_facts::FactStoreError;

/// Errors returned by request handlers.
#[derive(Debug)]
pub enum ApiError {
    /// No conversation server was configured at startup.
    ChatUnavailable,
    /// The hosted conversation service failed.
    Chat { details: String },
    /// No fact has the requested id.
    FactNotFound { id: String },
    /// The fact store refused a new fact.
    FactRejected(FactStoreError),
    /// The request body could not be understood.
    InvalidBody { reason: String },
    /// The hosted session service failed.
    SessionIssue { details: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChatUnavailable => write!(
                f,
                "ChatKit is not configured. Set OPENAI_API_KEY and CHATKIT_UPSTREAM_URL \
                 to enable the conversational endpoint."
            ),
            Self::Chat { details } => write!(f, "{details}"),
            Self::FactNotFound { .. } => write!(f, "Fact not found"),
            Self::FactRejected(err) => write!(f, "{err}"),
            Self::InvalidBody { reason } => write!(f, "Invalid request body: {reason}"),
            Self::SessionIssue { details } => {
                write!(f, "Failed to create ChatKit session: {details}")
            }
        }
    }
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ChatUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::FactNotFound { .. } => StatusCode::NOT_FOUND,
            Self::FactRejected(FactStoreError::DuplicateId { .. }) => StatusCode::CONFLICT,
            Self::FactRejected(FactStoreError::EmptyContent) | Self::InvalidBody { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Chat { .. } | Self::SessionIssue { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %detail, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %detail, "request rejected");
        }

        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl From<Report<ChatError>> for ApiError {
    fn from(report: Report<ChatError>) -> Self {
        Self::Chat {
            details: report.current_context().to_string(),
        }
    }
}

impl From<Report<SessionIssueError>> for ApiError {
    fn from(report: Report<SessionIssueError>) -> Self {
        Self::SessionIssue {
            details: report.current_context().to_string(),
        }
    }
}

impl From<Report<FactStoreError>> for ApiError {
    fn from(report: Report<FactStoreError>) -> Self {
        Self::FactRejected(report.current_context().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketbot_core::FactId;

    #[test]
    fn statuses() {
        assert_eq!(
            ApiError::ChatUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::FactNotFound { id: "x".into() }.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::FactRejected(FactStoreError::DuplicateId {
                id: FactId::new("x")
            })
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::FactRejected(FactStoreError::EmptyContent).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::SessionIssue {
                details: "boom".into()
            }
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn session_issue_detail_passes_cause_through() {
        let report: Report<SessionIssueError> = SessionIssueError::Rejected {
            status: 400,
            message: "Invalid workflow".to_string(),
        }
        .into();

        let err = ApiError::from(report);

        assert_eq!(
            err.to_string(),
            "Failed to create ChatKit session: hosted service returned status 400: Invalid workflow"
        );
    }

    #[test]
    fn fact_not_found_detail() {
        let err = ApiError::FactNotFound { id: "f1".into() };
        assert_eq!(err.to_string(), "Fact not found");
    }
}
