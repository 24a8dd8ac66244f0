//! Error types for the HTTP transport layer.

use http::StatusCode;
use stripe::StripeError;

/// Errors that can occur while talking to the API.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The response body did not decode into the expected entity.
    #[error("entity error: {0}")]
    Entity(#[from] StripeError),

    /// The API answered with a non-success status.
    #[error("API error {status} (request {}): {body}", .request_id.as_deref().unwrap_or("unknown"))]
    Api {
        /// HTTP status of the response.
        status: StatusCode,
        /// Server-assigned request identifier, if present.
        request_id: Option<String>,
        /// Raw response body.
        body: String,
    },

    /// A required configuration value is missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The request URL could not be built.
    #[cfg(feature = "client")]
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The underlying HTTP client failed.
    #[cfg(feature = "client")]
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// A middleware in the client stack failed.
    #[cfg(feature = "client")]
    #[error("middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),
}
