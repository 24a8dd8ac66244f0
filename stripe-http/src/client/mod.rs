//! Reqwest integration for the Stripe API.
//!
//! Two ways to send requests with telemetry relayed automatically:
//!
//! - **[`StripeClient`]** — authenticated client configured through
//!   [`ClientConfig`], decoding responses into
//!   [`StripeEntity`](stripe::StripeEntity) types.
//! - **[`ReqwestWithTelemetry`]** — adds a [`TelemetryMiddleware`] to an
//!   existing `reqwest` client or builder, for callers that manage their
//!   own middleware stack.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use stripe::RequestTelemetry;
//! use stripe_http::client::{ReqwestWithTelemetry, ReqwestWithTelemetryBuild};
//!
//! let telemetry = Arc::new(RequestTelemetry::new());
//! let client = reqwest::Client::new().with_telemetry(telemetry).build();
//! ```

mod api;
mod middleware;

pub use api::{ClientConfig, StripeClient};
pub use middleware::{TelemetryMiddleware, UsageTags};

use std::sync::Arc;

use reqwest::{Client, ClientBuilder};
use reqwest_middleware as rqm;
use stripe::telemetry::RequestTelemetry;

/// Trait for adding request telemetry to reqwest clients.
///
/// Implemented on [`Client`] and [`ClientBuilder`].
pub trait ReqwestWithTelemetry<A> {
    /// Adds a [`TelemetryMiddleware`] backed by `telemetry`.
    fn with_telemetry(self, telemetry: Arc<RequestTelemetry>) -> ReqwestWithTelemetryBuilder<A>;
}

impl ReqwestWithTelemetry<Self> for Client {
    fn with_telemetry(self, telemetry: Arc<RequestTelemetry>) -> ReqwestWithTelemetryBuilder<Self> {
        ReqwestWithTelemetryBuilder {
            inner: self,
            middleware: TelemetryMiddleware::new(telemetry),
        }
    }
}

impl ReqwestWithTelemetry<Self> for ClientBuilder {
    fn with_telemetry(self, telemetry: Arc<RequestTelemetry>) -> ReqwestWithTelemetryBuilder<Self> {
        ReqwestWithTelemetryBuilder {
            inner: self,
            middleware: TelemetryMiddleware::new(telemetry),
        }
    }
}

/// Builder for creating a reqwest client with telemetry middleware.
#[allow(missing_debug_implementations)] // reqwest::ClientBuilder does not implement Debug
pub struct ReqwestWithTelemetryBuilder<A> {
    inner: A,
    middleware: TelemetryMiddleware,
}

/// Trait for building the final client from a [`ReqwestWithTelemetryBuilder`].
pub trait ReqwestWithTelemetryBuild {
    /// The type returned by [`build`](Self::build)
    type BuildResult;
    /// The type returned by [`builder`](Self::builder)
    type BuilderResult;

    /// Builds the client, consuming the builder.
    fn build(self) -> Self::BuildResult;

    /// Returns the underlying middleware client builder with telemetry
    /// added, so further middleware can be stacked.
    fn builder(self) -> Self::BuilderResult;
}

impl ReqwestWithTelemetryBuild for ReqwestWithTelemetryBuilder<Client> {
    type BuildResult = rqm::ClientWithMiddleware;
    type BuilderResult = rqm::ClientBuilder;

    fn build(self) -> Self::BuildResult {
        self.builder().build()
    }

    fn builder(self) -> Self::BuilderResult {
        rqm::ClientBuilder::new(self.inner).with(self.middleware)
    }
}

impl ReqwestWithTelemetryBuild for ReqwestWithTelemetryBuilder<ClientBuilder> {
    type BuildResult = Result<rqm::ClientWithMiddleware, reqwest::Error>;
    type BuilderResult = Result<rqm::ClientBuilder, reqwest::Error>;

    fn build(self) -> Self::BuildResult {
        let builder = self.builder()?;
        Ok(builder.build())
    }

    fn builder(self) -> Self::BuilderResult {
        let client = self.inner.build()?;
        Ok(rqm::ClientBuilder::new(client).with(self.middleware))
    }
}
