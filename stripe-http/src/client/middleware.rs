//! Request telemetry middleware for reqwest.
//!
//! [`TelemetryMiddleware`] drives a shared [`RequestTelemetry`] relay around
//! every request: it attaches one queued sample before sending and records
//! the new response's timing after it arrives.

use std::sync::Arc;
use std::time::Instant;

use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware as rqm;
use stripe::telemetry::RequestTelemetry;
#[cfg(feature = "tracing")]
use tracing::{instrument, trace};

/// Tracked behaviors reported alongside a request's metrics.
///
/// Attach to a request with
/// [`RequestBuilder::with_extension`](reqwest_middleware::RequestBuilder::with_extension).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageTags(pub Vec<String>);

impl UsageTags {
    /// Creates a tag list from anything that yields strings.
    #[must_use]
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tags.into_iter().map(Into::into).collect())
    }
}

/// Middleware relaying request metrics through a [`RequestTelemetry`].
#[derive(Debug, Clone, Default)]
pub struct TelemetryMiddleware {
    telemetry: Arc<RequestTelemetry>,
}

impl TelemetryMiddleware {
    /// Creates a middleware backed by `telemetry`.
    #[must_use]
    pub const fn new(telemetry: Arc<RequestTelemetry>) -> Self {
        Self { telemetry }
    }

    /// Returns the relay this middleware feeds.
    #[must_use]
    pub const fn telemetry(&self) -> &Arc<RequestTelemetry> {
        &self.telemetry
    }
}

#[async_trait::async_trait]
impl rqm::Middleware for TelemetryMiddleware {
    /// Attaches a queued sample, sends the request, then records its timing.
    ///
    /// Transport errors are returned untouched and produce no sample.
    #[cfg_attr(
        feature = "tracing",
        instrument(name = "stripe.http.telemetry", skip_all, fields(url = %req.url()))
    )]
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: rqm::Next<'_>,
    ) -> rqm::Result<Response> {
        self.telemetry.maybe_add_telemetry_header(req.headers_mut());

        let started = Instant::now();
        let res = next.run(req, extensions).await?;
        let elapsed = started.elapsed();

        #[cfg(feature = "tracing")]
        trace!(status = ?res.status(), ?elapsed, "Request completed");

        let usage = extensions
            .get::<UsageTags>()
            .map_or(&[][..], |tags| tags.0.as_slice());
        self.telemetry
            .maybe_enqueue_metrics_with_usage(res.headers(), elapsed, usage);

        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use stripe::telemetry::{ClientTelemetryPayload, REQUEST_ID_HEADER, TELEMETRY_HEADER};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_with(middleware: TelemetryMiddleware) -> rqm::ClientWithMiddleware {
        rqm::ClientBuilder::new(reqwest::Client::new())
            .with(middleware)
            .build()
    }

    async fn mount_ok(server: &MockServer, request_id: &str) {
        Mock::given(method("GET"))
            .and(path("/v1/ping"))
            .respond_with(ResponseTemplate::new(200).insert_header(REQUEST_ID_HEADER, request_id))
            .mount(server)
            .await;
    }

    fn telemetry_of(request: &wiremock::Request) -> Option<ClientTelemetryPayload> {
        request
            .headers
            .get(TELEMETRY_HEADER)
            .map(|value| serde_json::from_str(value.to_str().unwrap()).unwrap())
    }

    #[tokio::test]
    async fn test_second_request_carries_first_metrics() {
        let server = MockServer::start().await;
        mount_ok(&server, "req_1").await;

        let telemetry = Arc::new(RequestTelemetry::new());
        let client = client_with(TelemetryMiddleware::new(Arc::clone(&telemetry)));
        let url = format!("{}/v1/ping", server.uri());

        client.get(&url).send().await.unwrap();
        assert_eq!(telemetry.len(), 1);
        client.get(&url).send().await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert!(telemetry_of(&requests[0]).is_none());

        let payload = telemetry_of(&requests[1]).unwrap();
        assert_eq!(payload.last_request_metrics.request_id, "req_1");
        assert!(payload.last_request_metrics.usage.is_none());
        // The second response was recorded in turn.
        assert_eq!(telemetry.len(), 1);
    }

    #[tokio::test]
    async fn test_usage_tags_are_relayed() {
        let server = MockServer::start().await;
        mount_ok(&server, "req_usage").await;

        let telemetry = Arc::new(RequestTelemetry::new());
        let client = client_with(TelemetryMiddleware::new(Arc::clone(&telemetry)));
        let url = format!("{}/v1/ping", server.uri());

        client
            .get(&url)
            .with_extension(UsageTags::new(["llm_agent", "batch"]))
            .send()
            .await
            .unwrap();
        client.get(&url).send().await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let payload = telemetry_of(&requests[1]).unwrap();
        assert_eq!(
            payload.last_request_metrics.usage,
            Some(vec!["llm_agent".to_owned(), "batch".to_owned()])
        );
    }

    #[tokio::test]
    async fn test_response_without_request_id_is_not_recorded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let telemetry = Arc::new(RequestTelemetry::new());
        let client = client_with(TelemetryMiddleware::new(Arc::clone(&telemetry)));

        client.get(server.uri()).send().await.unwrap();
        assert!(telemetry.is_empty());
    }

    #[tokio::test]
    async fn test_caller_header_is_preserved() {
        let server = MockServer::start().await;
        mount_ok(&server, "req_1").await;

        let telemetry = Arc::new(RequestTelemetry::new());
        let client = client_with(TelemetryMiddleware::new(Arc::clone(&telemetry)));
        let url = format!("{}/v1/ping", server.uri());

        client.get(&url).send().await.unwrap();
        client
            .get(&url)
            .header(TELEMETRY_HEADER, "caller-set")
            .send()
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[1].headers.get(TELEMETRY_HEADER).unwrap(), "caller-set");
        // The first sample is still queued next to the second one.
        assert_eq!(telemetry.len(), 2);
    }

    #[tokio::test]
    async fn test_connection_error_passes_through() {
        let telemetry = Arc::new(RequestTelemetry::new());
        let client = client_with(TelemetryMiddleware::new(Arc::clone(&telemetry)));

        let result = client.get("http://127.0.0.1:1/v1/ping").send().await;
        assert!(result.is_err());
        assert!(telemetry.is_empty());
    }
}
