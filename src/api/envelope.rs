use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::TextbinError;

/// Every API response is wrapped as `{success, body}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub body: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(body: T) -> Self {
        Self {
            success: true,
            body,
        }
    }

    /// Unwrap the body, refusing envelopes flagged as unsuccessful.
    pub fn into_body(self) -> Result<T, TextbinError> {
        if self.success {
            Ok(self.body)
        } else {
            Err(TextbinError::RequestFailed(
                "Server reported an unsuccessful response".into(),
            ))
        }
    }
}

/// Error body returned on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(default)]
    pub success: bool,
}

impl ApiErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            success: false,
        }
    }
}

/// Whether 401/403 on this endpoint means wrong credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Credentialed,
    Open,
}

/// Turn a non-2xx response into an error.
///
/// The server's `error` text is kept when the body parses; otherwise the
/// status line stands in for it.
pub fn error_from_response(status: StatusCode, body: &str, gate: Gate) -> TextbinError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| format!("HTTP {status}"));

    match (gate, status) {
        (Gate::Credentialed, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
            TextbinError::AccessDenied(message)
        }
        _ => TextbinError::RequestFailed(message),
    }
}
