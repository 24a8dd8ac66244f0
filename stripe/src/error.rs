//! Error types for the core crate.

/// Errors raised while converting entities to or from JSON.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
