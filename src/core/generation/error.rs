//! Generation pipeline error types.

use reqwest::StatusCode;

/// Errors surfaced to the caller from a generation attempt.
///
/// Locally-recovered conditions (persistence failure, corrupt cache) never
/// appear here; they go through the monitor and the flow continues.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Generation limit reached ({limit}). Upgrade your plan to keep generating.")]
    QuotaExceeded { limit: i64 },

    /// The endpoint rejected the request; carries its reported message.
    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Extract the endpoint's error message from a failure body.
/// Falls back to the HTTP status when the body is not the expected JSON shape.
pub fn extract_error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| format!("HTTP {}", status))
}
