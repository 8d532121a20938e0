//! Unified error types for the tablevote backend.
//!
//! Error codes map onto HTTP responses at the API boundary:
//! - SESSION_404: session or resource does not exist
//! - PART_403: unknown participant acting on a session
//! - VALID_400: malformed request payload
//! - STORE_503: durable store unreachable and fallback disabled
//! - INTERNAL_500: everything else

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the tablevote backend.
#[derive(Debug, Error)]
pub enum Error {
    /// Session (or other addressed resource) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A vote/done operation referenced a participant id that is not
    /// part of the session. Treated as an unauthorized action.
    #[error("unknown participant: {0}")]
    UnknownParticipant(String),

    /// Malformed payload: bad restaurant id, bad choice, invalid
    /// area/filter/threshold on creation.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Durable backend unreachable and the in-process fallback is
    /// disabled. Retryable by the caller.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A single storage operation exceeded its latency bound. Handled
    /// internally by the fallback path; only surfaces (as
    /// StorageUnavailable) when fallback is disabled.
    #[error("storage operation '{op}' timed out after {bound_ms}ms")]
    Timeout { op: &'static str, bound_ms: u64 },

    #[error("restaurant source error: {0}")]
    RestaurantSource(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unknown_participant(id: impl Into<String>) -> Self {
        Self::UnknownParticipant(id.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn storage_unavailable(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    pub fn restaurant_source(msg: impl Into<String>) -> Self {
        Self::RestaurantSource(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::UnknownParticipant(_) => 403,
            Self::BadRequest(_) => 400,
            Self::StorageUnavailable(_) => 503,
            Self::Timeout { .. } => 503,
            Self::RestaurantSource(_) => 502,
            Self::Serialization(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Get the wire error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "SESSION_404",
            Self::UnknownParticipant(_) => "PART_403",
            Self::BadRequest(_) => "VALID_400",
            Self::StorageUnavailable(_) | Self::Timeout { .. } => "STORE_503",
            Self::RestaurantSource(_) => "SOURCE_502",
            Self::Serialization(_) | Self::Internal(_) => "INTERNAL_500",
        }
    }
}
