use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::types::ErrorBody;

/// Authentication errors for the middleware layer.
///
/// Every variant renders as the uniform `{success: false, error: {code, message}}`
/// envelope. Upstream and configuration details are logged, never sent.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Callback reached without an authorization code.
    #[error("No code provided")]
    MissingCode,

    /// Discord rejected the exchange or could not be reached.
    #[error("Upstream auth error: {0}")]
    Upstream(String),

    /// Request carried no session cookie.
    #[error("No token provided")]
    NoToken,

    /// Session cookie failed signature or expiry checks.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server-side failure unrelated to the caller's input.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingCode => StatusCode::BAD_REQUEST,
            Self::NoToken | Self::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            Self::Upstream(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Code and message sent to the client.
    #[must_use]
    pub fn public_parts(&self) -> (&'static str, &'static str) {
        match self {
            Self::MissingCode => ("MISSING_CODE", "No code provided."),
            Self::Upstream(_) => ("AUTHENTICATION_FAILED", "Authentication failed."),
            Self::NoToken => ("NO_TOKEN", "No token provided."),
            Self::InvalidToken(_) => ("INVALID_TOKEN", "Invalid or expired token."),
            Self::Config(_) | Self::Internal(_) => ("INTERNAL_ERROR", "Internal error."),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            Self::Upstream(_) | Self::Config(_) | Self::Internal(_) => {
                tracing::error!(error = %self, "Auth internal error");
            }
            Self::InvalidToken(reason) => {
                tracing::debug!(reason = %reason, "Rejected session token");
            }
            Self::MissingCode | Self::NoToken => {}
        }

        let (code, message) = self.public_parts();
        (self.status(), Json(ErrorBody::new(code, message))).into_response()
    }
}

impl From<crate::error::Error> for AuthError {
    fn from(e: crate::error::Error) -> Self {
        match e {
            crate::error::Error::Token(_) | crate::error::Error::TokenExpired => {
                Self::InvalidToken(e.to_string())
            }
            crate::error::Error::Config(msg) => Self::Config(msg),
            other => Self::Upstream(other.to_string()),
        }
    }
}
