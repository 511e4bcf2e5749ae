use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Every failure a view can see. Classified only by whether the backend
/// supplied a readable `detail`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("could not reach backend: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),
}

/// FastAPI-style error body. `detail` is a string for handled errors and a
/// list for validation failures; only the string form is shown to users.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl ApiError {
    pub(crate) fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let detail = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail.as_str().map(str::to_owned))
            .filter(|d| !d.trim().is_empty());
        ApiError::Status { status, detail }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            ApiError::Invalid(msg) => Some(msg),
            _ => None,
        }
    }

    /// Message for a toast: the backend detail when present, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ApiError::Status { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
