//! Client-side request telemetry.
//!
//! After each request we remember how long it took and under which
//! server-assigned `Request-Id` it ran. The next outgoing request carries
//! one such sample in the `X-Stripe-Client-Telemetry` header:
//!
//! ```json
//! {"last_request_metrics":{"request_id":"req_123","request_duration_ms":42}}
//! ```
//!
//! Samples are relayed in the order they were recorded and each one is sent
//! at most once. The queue is bounded by [`MAX_REQUEST_METRICS_QUEUE_SIZE`];
//! once full, new samples are dropped and the queued ones are kept.
//!
//! Nothing here returns an error or panics. A missing header, a full queue
//! or an empty queue all leave the request untouched.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use http::{HeaderMap, HeaderValue};
//! use stripe::telemetry::{REQUEST_ID_HEADER, RequestTelemetry, TELEMETRY_HEADER};
//!
//! let telemetry = RequestTelemetry::new();
//!
//! let mut response_headers = HeaderMap::new();
//! response_headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req_1"));
//! telemetry.maybe_enqueue_metrics(&response_headers, Duration::from_millis(150));
//!
//! let mut request_headers = HeaderMap::new();
//! telemetry.maybe_add_telemetry_header(&mut request_headers);
//! assert!(request_headers.contains_key(TELEMETRY_HEADER));
//! ```

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use http::{HeaderMap, HeaderValue, Response};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
#[cfg(feature = "tracing")]
use tracing::{debug, trace};

/// Outgoing header carrying a serialized [`ClientTelemetryPayload`].
pub const TELEMETRY_HEADER: &str = "X-Stripe-Client-Telemetry";

/// Response header holding the server-assigned request identifier.
pub const REQUEST_ID_HEADER: &str = "Request-Id";

/// Maximum number of samples waiting to be relayed.
pub const MAX_REQUEST_METRICS_QUEUE_SIZE: usize = 100;

/// Timing of one completed request.
///
/// Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetrics {
    /// Identifier the API assigned to the request.
    pub request_id: String,

    /// Wall-clock duration in whole milliseconds.
    pub request_duration_ms: u64,

    /// Tracked behaviors reported for the request. Never `Some` of an empty list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Vec<String>>,
}

impl RequestMetrics {
    /// Builds a sample, truncating `duration` to whole milliseconds.
    ///
    /// An empty `usage` slice is stored as `None`.
    #[must_use]
    pub fn new(request_id: impl Into<String>, duration: Duration, usage: &[String]) -> Self {
        Self {
            request_id: request_id.into(),
            request_duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            usage: (!usage.is_empty()).then(|| usage.to_vec()),
        }
    }
}

/// Envelope sent in the [`TELEMETRY_HEADER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientTelemetryPayload {
    /// The relayed sample.
    pub last_request_metrics: RequestMetrics,
}

impl ClientTelemetryPayload {
    /// Serializes the payload as compact, ASCII-only JSON.
    ///
    /// Non-ASCII characters are written as `\uXXXX` escapes, so the result
    /// is always a valid header value and decodes back to the same strings.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_header_string(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::with_capacity(128);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, AsciiFormatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Compact JSON formatter that escapes every non-ASCII character.
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut units = [0u16; 2];
        let mut utf8 = [0u8; 4];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(ch.encode_utf8(&mut utf8).as_bytes())?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

/// Bounded FIFO of [`RequestMetrics`] shared by every request a client sends.
///
/// One instance belongs to one client; wrap it in an `Arc` to share it
/// between the tasks issuing requests. All methods take `&self` and only
/// hold the internal lock for a single push or pop.
#[derive(Debug, Default)]
pub struct RequestTelemetry {
    prev_request_metrics: Mutex<VecDeque<RequestMetrics>>,
}

impl RequestTelemetry {
    /// Creates an empty relay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples waiting to be relayed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prev_request_metrics.lock().len()
    }

    /// Returns `true` if no sample is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prev_request_metrics.lock().is_empty()
    }

    /// Records a completed request without usage tags.
    ///
    /// See [`Self::maybe_enqueue_metrics_with_usage`].
    pub fn maybe_enqueue_metrics(&self, response_headers: &HeaderMap, duration: Duration) {
        self.maybe_enqueue_metrics_with_usage(response_headers, duration, &[]);
    }

    /// Records a completed request if it has a `Request-Id` and the queue
    /// has room; otherwise does nothing.
    ///
    /// Only the first `Request-Id` value is used. A value that is not
    /// visible ASCII is treated as absent.
    pub fn maybe_enqueue_metrics_with_usage(
        &self,
        response_headers: &HeaderMap,
        duration: Duration,
        usage: &[String],
    ) {
        let Some(request_id) = response_headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
        else {
            return;
        };

        let mut queue = self.prev_request_metrics.lock();
        if queue.len() >= MAX_REQUEST_METRICS_QUEUE_SIZE {
            #[cfg(feature = "tracing")]
            debug!(request_id, "Telemetry queue full, dropping request metrics");
            return;
        }

        let metrics = RequestMetrics::new(request_id, duration, usage);
        #[cfg(feature = "tracing")]
        trace!(
            request_id = %metrics.request_id,
            duration_ms = metrics.request_duration_ms,
            "Queued request metrics"
        );
        queue.push_back(metrics);
    }

    /// Records a completed typed response.
    pub fn record_response<B>(&self, response: &Response<B>, duration: Duration, usage: &[String]) {
        self.maybe_enqueue_metrics_with_usage(response.headers(), duration, usage);
    }

    /// Attaches the oldest queued sample to `headers` as
    /// [`TELEMETRY_HEADER`].
    ///
    /// Does nothing if the header is already set or the queue is empty.
    pub fn maybe_add_telemetry_header(&self, headers: &mut HeaderMap) {
        if headers.contains_key(TELEMETRY_HEADER) {
            return;
        }

        let Some(last_request_metrics) = self.prev_request_metrics.lock().pop_front() else {
            return;
        };

        let payload = ClientTelemetryPayload {
            last_request_metrics,
        };
        let value = payload
            .to_header_string()
            .ok()
            .and_then(|json| HeaderValue::from_str(&json).ok());

        match value {
            Some(value) => {
                #[cfg(feature = "tracing")]
                trace!(
                    request_id = %payload.last_request_metrics.request_id,
                    "Attached telemetry header"
                );
                headers.insert(TELEMETRY_HEADER, value);
            }
            None => {
                #[cfg(feature = "tracing")]
                debug!(
                    request_id = %payload.last_request_metrics.request_id,
                    "Request metrics are not a valid header value, dropping"
                );
            }
        }
    }
}
