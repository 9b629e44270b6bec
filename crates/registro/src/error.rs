//! Errors returned by the backend client.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never produced a response (connect, DNS, body read).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend rejected the credentials or token.
    #[error("authentication required")]
    Unauthorized,

    /// Any other non-2xx response.
    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// 2xx response whose body did not decode.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// True when the failure happened before any response arrived.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
