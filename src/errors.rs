//! Standardized error types following the `error-harness-<domain>-<number>` format.

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

use crate::registration::schema::FieldErrors;

/// Configuration errors that occur during application startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error when HTTP_PORT cannot be parsed
    #[error("error-harness-config-1 Parsing HTTP_PORT into u16 failed: {0:?}")]
    PortParsingFailed(std::num::ParseIntError),

    /// Error when version information is not available
    #[error("error-harness-config-2 One of GIT_HASH or CARGO_PKG_VERSION must be set")]
    VersionNotSet,

    /// Error when duration string cannot be parsed
    #[error("error-harness-config-3 Failed to parse duration '{0}': {1}")]
    DurationParsingFailed(String, String),

    /// Error when boolean string cannot be parsed
    #[error(
        "error-harness-config-4 Failed to parse boolean '{0}': expected true/false/1/0/yes/no/on/off"
    )]
    BoolParsingFailed(String),

    /// Error when a configured URL is not an absolute URL
    #[error("error-harness-config-5 Invalid URL '{0}': {1}")]
    UrlParsingFailed(String, url::ParseError),
}

/// HTTP server errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// Error when request processing fails
    #[error("error-harness-http-1 Request processing failed: {0}")]
    RequestProcessingFailed(String),
}

/// Registration payload, mock response, and presentation errors
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// One or more fields failed validation
    #[error("error-harness-registration-1 Invalid registration payload: {0}")]
    InvalidPayload(FieldErrors),

    /// The payload endpoint has no usable origin
    #[error("error-harness-registration-2 Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// JSON encoding of a header or claims set failed
    #[error("error-harness-registration-3 Encoding failed: {0}")]
    EncodingFailed(String),

    /// A pseudo-JWT could not be split or decoded
    #[error("error-harness-registration-4 Malformed token: {0}")]
    MalformedToken(String),
}

/// Mock login errors
#[derive(Debug, Error)]
pub enum LoginError {
    /// Credentials are missing or not well-formed
    #[error("error-harness-login-1 Invalid credentials")]
    InvalidCredentials,
}

/// Simple registration (`/api/register`) errors
#[derive(Debug, Error)]
pub enum SignupError {
    /// One or more fields failed validation
    #[error("error-harness-signup-1 Invalid signup form: {0}")]
    InvalidForm(FieldErrors),

    /// The request never produced a response
    #[error("error-harness-signup-2 Registration request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The registration API answered with a non-success status
    #[error("error-harness-signup-3 Registration rejected with status {0}")]
    Rejected(StatusCode),
}

pub type Result<T> = std::result::Result<T, HttpError>;

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self, "internal server error");
        (StatusCode::INTERNAL_SERVER_ERROR).into_response()
    }
}

impl From<RegistrationError> for HttpError {
    fn from(err: RegistrationError) -> Self {
        HttpError::RequestProcessingFailed(err.to_string())
    }
}
