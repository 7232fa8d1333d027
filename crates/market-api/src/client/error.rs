//! Error handling utilities for HTTP calls

use market_core::DomainError;
use serde::{Deserialize, Serialize};

/// Error body returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
}

/// Convert a transport failure to DomainError
pub fn map_transport_error(e: &reqwest::Error) -> DomainError {
    if e.is_timeout() {
        DomainError::Transport("request timed out".to_string())
    } else if e.is_decode() {
        DomainError::MalformedResponse(e.to_string())
    } else {
        DomainError::Transport(e.to_string())
    }
}

/// Convert a decode failure to DomainError
pub fn map_decode_error(e: &serde_json::Error) -> DomainError {
    DomainError::MalformedResponse(e.to_string())
}

/// Build the error for a non-success status
///
/// 401 maps to `Unauthorized`; anything else becomes `Rejected` with the
/// server's message when the body carries one.
pub fn error_from_status(status: u16, body: &[u8]) -> DomainError {
    if status == 401 {
        return DomainError::Unauthorized;
    }

    let message = match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody {
            code: Some(code),
            message,
        }) => format!("{code}: {message}"),
        Ok(ErrorBody { message, .. }) => message,
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                format!("HTTP {status}")
            } else {
                text
            }
        }
    };

    DomainError::Rejected { status, message }
}
