//! Errors from a generation call.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use super::wire::ErrorEnvelope;

/// Failure of a single remote call. The chat stays usable afterwards.
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    #[error("{status} {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("model returned no text (reason: {reason})")]
    EmptyResponse { reason: String },
}

impl GeminiError {
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Transport(err)
        }
    }

    /// Build an error from a non-success response, preferring the provider's
    /// own message over the raw body.
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|envelope| {
                let detail = envelope.error.message?;
                Some(match envelope.error.status {
                    Some(code) if !code.is_empty() => format!("{code}: {detail}"),
                    _ => detail,
                })
            })
            .unwrap_or_else(|| {
                let body = body.trim();
                if body.is_empty() {
                    status.canonical_reason().unwrap_or("error").to_string()
                } else {
                    body.to_string()
                }
            });

        Self::Api {
            status: status.as_u16(),
            message,
        }
    }
}
