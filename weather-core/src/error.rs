use serde::{Deserialize, Serialize};
use thiserror::Error;

const FALLBACK_MESSAGE: &str = "Unexpected error occurred";
const NETWORK_ERROR_CODE: &str = "NETWORK_ERROR";

/// Structured error detail sent by the API on non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub status: Option<u16>,
}

/// Error body envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// The uniform error every failed API call ends in.
///
/// There is no public constructor other than [`ApiError::normalize`] (and the
/// timeout helper built on it), so every failure path goes through the same
/// precedence rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    message: String,
    code: String,
    status: Option<u16>,
    aborted: bool,
}

impl ApiError {
    /// Build a normalized error from whatever the failure path knows.
    ///
    /// A structured `detail` wins for code and message; its own status is
    /// preferred over the HTTP `status`. Without a detail the code is
    /// `HTTP_<status>` when a status is known and `NETWORK_ERROR` otherwise.
    pub fn normalize(
        detail: Option<ErrorDetail>,
        status: Option<u16>,
        fallback: Option<&str>,
    ) -> Self {
        match detail {
            Some(detail) => Self {
                message: detail.message,
                code: detail.code,
                status: detail.status.or(status),
                aborted: false,
            },
            None => Self {
                message: fallback.unwrap_or(FALLBACK_MESSAGE).to_string(),
                code: match status {
                    Some(status) => format!("HTTP_{status}"),
                    None => NETWORK_ERROR_CODE.to_string(),
                },
                status,
                aborted: false,
            },
        }
    }

    /// Error reported when a request was aborted, by its deadline or by the caller.
    pub fn timed_out() -> Self {
        Self {
            aborted: true,
            ..Self::normalize(None, Some(408), Some("Request timed out"))
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// True only for local aborts. A 408 sent by the server is a plain HTTP error.
    pub fn is_timeout(&self) -> bool {
        self.aborted
    }
}

/// Rejections raised while building a search locally, before any request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("Provide a city name")]
    EmptyCity,

    #[error("Latitude and longitude must be numbers")]
    NotANumber,

    #[error("Latitude {0} is out of range (-90..=90)")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} is out of range (-180..=180)")]
    LongitudeOutOfRange(f64),
}
