#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP transport for the Stripe API SDK.
//!
//! Wires the [`RequestTelemetry`](stripe::telemetry::RequestTelemetry) relay
//! into a `reqwest` middleware stack and provides a small authenticated
//! client on top of it.
//!
//! # Modules
//!
//! - [`constants`] — Header names and default endpoints
//! - [`error`] — HTTP transport error types
//! - [`client`] — Telemetry middleware and API client (feature: `client`)

pub mod constants;
pub mod error;

#[cfg(feature = "client")]
pub mod client;
