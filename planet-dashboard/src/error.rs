//! Error types for telemetry fetching

use serde::Serialize;
use thiserror::Error;

pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Why a fetch cycle produced no payload
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl TelemetryError {
    /// Every failure is shown to the user the same way
    pub fn kind(&self) -> ErrorKind {
        match self {
            TelemetryError::Network(_)
            | TelemetryError::Status { .. }
            | TelemetryError::MalformedPayload(_) => ErrorKind::Network,
        }
    }
}

impl From<reqwest::Error> for TelemetryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TelemetryError::MalformedPayload(err.to_string())
        } else {
            TelemetryError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TelemetryError {
    fn from(err: serde_json::Error) -> Self {
        TelemetryError::MalformedPayload(err.to_string())
    }
}

/// User-visible error classification stored in snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "network")]
    Network,
}
