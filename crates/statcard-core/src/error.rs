//! Shared error type across statcard crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input.
    BadRequest,
    /// Invalid or inconsistent configuration.
    Config,
    /// An upstream collaborator failed or answered garbage.
    Upstream,
    /// Credential missing or rejected.
    Unauthorized,
    /// Upstream resource does not exist.
    NotFound,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Config => "CONFIG",
            ClientCode::Upstream => "UPSTREAM",
            ClientCode::Unauthorized => "UNAUTHORIZED",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, StatCardError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum StatCardError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("config: {0}")]
    Config(String),
    #[error("upstream: {0}")]
    Upstream(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl StatCardError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            StatCardError::BadRequest(_) => ClientCode::BadRequest,
            StatCardError::Config(_) => ClientCode::Config,
            StatCardError::Upstream(_) => ClientCode::Upstream,
            StatCardError::Unauthorized(_) => ClientCode::Unauthorized,
            StatCardError::NotFound(_) => ClientCode::NotFound,
            StatCardError::Internal(_) => ClientCode::Internal,
        }
    }
}
