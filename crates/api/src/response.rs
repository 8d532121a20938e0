//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use vote_core::{Participant, Results, Session, VoteOutcome};

/// Create-session success payload. The session id doubles as the
/// invite handle.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session: Session,
}

/// Join success payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct JoinResponse {
    pub participant: Participant,
    pub session: Session,
}

/// Vote success payload (matches the aggregate's vote outcome).
#[derive(Debug, Serialize, Deserialize)]
pub struct VoteResponse {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    pub yes_count: u32,
    pub needed: u32,
}

impl From<VoteOutcome> for VoteResponse {
    fn from(outcome: VoteOutcome) -> Self {
        Self {
            matched: outcome.matched,
            winner: outcome.winner,
            yes_count: outcome.yes_count,
            needed: outcome.needed,
        }
    }
}

/// Mark-done success payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct DoneResponse {
    pub session_finished: bool,
    pub session: Session,
}

/// Results payload wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResultsResponse {
    #[serde(flatten)]
    pub results: Results,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub redis_connected: bool,
    pub fallback_active: bool,
    pub fallback_entries: u64,
    pub ws_connections: u64,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// API error type mapping domain errors onto HTTP responses.
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, "VALID_400", msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::NOT_FOUND, "SESSION_404", msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_500", msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<vote_core::Error> for ApiError {
    fn from(err: vote_core::Error) -> Self {
        let status = StatusCode::from_u16(err.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        ApiError::with_code(status, err.error_code(), err.to_string())
    }
}
