use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use strum_macros::AsRefStr;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("method not allowed: {0}")]
    MethodNotAllowed(Method),
    #[error("invalid json in request body: {0}")]
    InvalidJson(String),
    #[error("email is required")]
    EmailMissing,

    #[error("email service not properly configured")]
    EmailServiceNotConfigured,

    #[error("failed to send confirmation email: {0}")]
    EmailDelivery(String),

    #[error("templating error: {0}")]
    Template(#[from] crate::templ_manager::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a failed signup, used for logging and status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
pub enum ErrorCategory {
    /// Bad method, bad JSON or a missing field. Never retried by the service.
    ClientInput,
    /// A required credential is missing. Only the operator can fix it.
    Configuration,
    /// The email provider failed. The caller may retry.
    Upstream,
    Internal,
}

/// The single JSON shape every failed request is answered with.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl From<crate::email_client::Error> for Error {
    fn from(value: crate::email_client::Error) -> Self {
        Error::EmailDelivery(value.to_string())
    }
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MethodNotAllowed(_) | Error::InvalidJson(_) | Error::EmailMissing => {
                ErrorCategory::ClientInput
            }
            Error::EmailServiceNotConfigured => ErrorCategory::Configuration,
            Error::EmailDelivery(_) => ErrorCategory::Upstream,
            Error::Template(_) | Error::Internal(_) => ErrorCategory::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Error::InvalidJson(_) | Error::EmailMissing => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn client_body(&self) -> ErrorBody {
        let (error, details, method) = match self {
            Error::MethodNotAllowed(method) => {
                ("Method not allowed", None, Some(method.to_string()))
            }
            Error::InvalidJson(details) => {
                ("Invalid JSON in request body", Some(details.clone()), None)
            }
            Error::EmailMissing => ("Email is required", None, None),
            Error::EmailServiceNotConfigured => (
                "Server configuration error",
                Some("Email service not properly configured".to_string()),
                None,
            ),
            Error::EmailDelivery(details) => (
                "Failed to send confirmation email",
                Some(details.clone()),
                None,
            ),
            Error::Template(er) => ("Internal server error", Some(er.to_string()), None),
            Error::Internal(details) => ("Internal server error", Some(details.clone()), None),
        };

        ErrorBody {
            error,
            details,
            method,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = self.status_code().into_response();

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}
