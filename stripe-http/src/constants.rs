//! HTTP-specific constants for the Stripe API.

use std::time::Duration;

pub use stripe::telemetry::{REQUEST_ID_HEADER, TELEMETRY_HEADER};

/// Default API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(80);

/// Environment variable holding the secret API key.
pub const API_KEY_ENV: &str = "STRIPE_API_KEY";

/// Environment variable overriding [`DEFAULT_API_BASE`].
pub const API_BASE_ENV: &str = "STRIPE_API_BASE";

/// Environment variable toggling request telemetry (`true`/`false`, `1`/`0`).
pub const ENABLE_TELEMETRY_ENV: &str = "STRIPE_ENABLE_TELEMETRY";
