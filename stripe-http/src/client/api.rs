//! Authenticated API client.
//!
//! [`StripeClient`] owns one [`RequestTelemetry`] relay and installs a
//! [`TelemetryMiddleware`] on its request stack unless telemetry is
//! disabled in [`ClientConfig`].

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest_middleware as rqm;
use stripe::StripeEntity;
use stripe::telemetry::RequestTelemetry;
#[cfg(feature = "tracing")]
use tracing::{debug, instrument};
use url::Url;

use super::middleware::{TelemetryMiddleware, UsageTags};
use crate::constants::{
    API_BASE_ENV, API_KEY_ENV, DEFAULT_API_BASE, DEFAULT_TIMEOUT, ENABLE_TELEMETRY_ENV,
    REQUEST_ID_HEADER,
};
use crate::error::HttpError;

/// Configuration for [`StripeClient`].
#[derive(Clone)]
pub struct ClientConfig {
    /// Secret API key sent as a bearer token.
    pub api_key: String,

    /// API base URL (default: [`DEFAULT_API_BASE`]).
    pub api_base: String,

    /// Per-request timeout. Ignored when `http_client` is set.
    pub timeout: Duration,

    /// Whether request metrics are relayed to the API (default: `true`).
    pub enable_telemetry: bool,

    /// Optional pre-configured reqwest client. If `None`, a new client is
    /// created with the configured timeout.
    pub http_client: Option<reqwest::Client>,
}

impl ClientConfig {
    /// Creates a config with the given API key and defaults for everything else.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            enable_telemetry: true,
            http_client: None,
        }
    }

    /// Loads the config from the process environment, after reading a
    /// `.env` file if one exists.
    ///
    /// - `STRIPE_API_KEY` — required
    /// - `STRIPE_API_BASE` — optional base URL override
    /// - `STRIPE_ENABLE_TELEMETRY` — optional, `true`/`false` or `1`/`0`
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Config`] if a `.env` file exists but cannot be
    /// loaded, the key is missing, or the telemetry flag is not a boolean.
    pub fn from_env() -> Result<Self, HttpError> {
        check_env_file(dotenvy::dotenv())?;
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`Self::from_env`], reading the given env file instead of
    /// searching for `.env`. A missing file is skipped.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, HttpError> {
        check_env_file(dotenvy::from_path(path))?;
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, HttpError> {
        let api_key = lookup(API_KEY_ENV)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| HttpError::Config(format!("{API_KEY_ENV} is not set")))?;

        let mut config = Self::new(api_key);
        if let Some(api_base) = lookup(API_BASE_ENV) {
            config.api_base = api_base;
        }
        if let Some(flag) = lookup(ENABLE_TELEMETRY_ENV) {
            config.enable_telemetry = parse_flag(&flag).ok_or_else(|| {
                HttpError::Config(format!("{ENABLE_TELEMETRY_ENV} must be a boolean, got {flag:?}"))
            })?;
        }
        Ok(config)
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Turns request telemetry on or off.
    #[must_use]
    pub const fn with_telemetry(mut self, enabled: bool) -> Self {
        self.enable_telemetry = enabled;
        self
    }

    /// Sets a pre-configured reqwest client.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .field("enable_telemetry", &self.enable_telemetry)
            .field("has_http_client", &self.http_client.is_some())
            .finish()
    }
}

/// Accepts a loaded or missing env file; any other failure is a config error.
fn check_env_file<T>(result: dotenvy::Result<T>) -> Result<(), HttpError> {
    match result {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(HttpError::Config(format!("failed to load env file: {e}"))),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Async client for the Stripe API.
///
/// # Example
///
/// ```no_run
/// use stripe::tax::registrations::RegistrationCountryOptionsEs;
/// use stripe_http::client::{ClientConfig, StripeClient};
///
/// # async fn run() -> Result<(), stripe_http::error::HttpError> {
/// let client = StripeClient::new(ClientConfig::new("sk_test_123"))?;
/// let options: RegistrationCountryOptionsEs =
///     client.get("/v1/tax/registrations/taxreg_123/country_options/es").await?;
/// # Ok(())
/// # }
/// ```
pub struct StripeClient {
    api_base: Url,
    api_key: String,
    telemetry: Arc<RequestTelemetry>,
    client: rqm::ClientWithMiddleware,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("api_base", &self.api_base.as_str())
            .field("telemetry", &self.telemetry)
            .finish_non_exhaustive()
    }
}

impl StripeClient {
    /// Creates a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Config`] for an empty API key,
    /// [`HttpError::Url`] for an unparsable base URL and
    /// [`HttpError::Reqwest`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, HttpError> {
        if config.api_key.is_empty() {
            return Err(HttpError::Config("API key is empty".to_owned()));
        }
        let api_base = Url::parse(&config.api_base)?;

        let http_client = match config.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(config.timeout)
                .build()?,
        };

        let telemetry = Arc::new(RequestTelemetry::new());
        let mut builder = rqm::ClientBuilder::new(http_client);
        if config.enable_telemetry {
            builder = builder.with(TelemetryMiddleware::new(Arc::clone(&telemetry)));
        }

        Ok(Self {
            api_base,
            api_key: config.api_key,
            telemetry,
            client: builder.build(),
        })
    }

    /// Returns the API base URL.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Returns the telemetry relay owned by this client.
    #[must_use]
    pub const fn telemetry(&self) -> &Arc<RequestTelemetry> {
        &self.telemetry
    }

    /// Fetches and decodes the resource at `path`.
    ///
    /// `path` is resolved against the API base with URL-join rules: an
    /// absolute path such as `/v1/...` replaces any path on the base
    /// (`https://proxy.example/stripe` + `/v1/x` is `https://proxy.example/v1/x`),
    /// while a relative path such as `v1/...` is appended after the base's
    /// last `/`. Configure a proxy mount as `https://proxy.example/stripe/`
    /// and use relative paths to keep it.
    ///
    /// # Errors
    ///
    /// See [`Self::get_with_usage`].
    pub async fn get<T: StripeEntity>(&self, path: &str) -> Result<T, HttpError> {
        self.get_with_usage(path, UsageTags::default()).await
    }

    /// Fetches and decodes the resource at `path`, reporting `usage` with
    /// the request's telemetry.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Api`] for a non-success status,
    /// [`HttpError::Entity`] if the body does not match `T`, and transport
    /// errors otherwise.
    #[cfg_attr(
        feature = "tracing",
        instrument(name = "stripe.http.get", skip(self, usage), err)
    )]
    pub async fn get_with_usage<T: StripeEntity>(
        &self,
        path: &str,
        usage: UsageTags,
    ) -> Result<T, HttpError> {
        let url = self.api_base.join(path)?;
        let mut request = self.client.get(url).bearer_auth(&self.api_key);
        if !usage.0.is_empty() {
            request = request.with_extension(usage);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let request_id = response
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let body = response.text().await?;
            #[cfg(feature = "tracing")]
            debug!(%status, ?request_id, "API returned an error status");
            return Err(HttpError::Api {
                status,
                request_id,
                body,
            });
        }

        let body = response.text().await?;
        Ok(T::from_json(&body)?)
    }
}
