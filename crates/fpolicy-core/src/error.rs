//! Shared error type across fpolicy crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request or config.
    BadRequest,
    /// Missing or wrong admin credentials.
    AuthFailed,
    /// Unknown feature identifier.
    NotFound,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::AuthFailed => "AUTH_FAILED",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, FpolicyError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum FpolicyError {
    #[error("feature not found: {0}")]
    NotFound(String),
    /// A stored override with the wrong shape or an unknown token.
    /// Recovered locally by falling back to the feature default.
    #[error("malformed override for {feature}: {reason}")]
    MalformedOverride { feature: String, reason: String },
    #[error("auth failed")]
    AuthFailed,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl FpolicyError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            FpolicyError::NotFound(_) => ClientCode::NotFound,
            FpolicyError::MalformedOverride { .. } => ClientCode::BadRequest,
            FpolicyError::AuthFailed => ClientCode::AuthFailed,
            FpolicyError::BadRequest(_) => ClientCode::BadRequest,
            FpolicyError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            FpolicyError::Internal(_) => ClientCode::Internal,
        }
    }
}
