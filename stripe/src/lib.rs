#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the Stripe API SDK.
//!
//! This crate holds the transport-agnostic half of the SDK: entity types
//! mirroring API resources, the JSON conversion trait they share, and the
//! request telemetry relay used by the HTTP transport.
//!
//! # Modules
//!
//! - [`entity`] - The [`StripeEntity`](entity::StripeEntity) JSON trait
//! - [`error`] - Core error type
//! - [`tax`] - Tax API resources
//! - [`telemetry`] - Request metrics relayed to the API on later requests
//!
//! # Feature Flags
//!
//! - `tracing` - Enables tracing instrumentation for debugging and monitoring

pub mod entity;
pub mod error;
pub mod tax;
pub mod telemetry;

pub use entity::StripeEntity;
pub use error::StripeError;
pub use telemetry::RequestTelemetry;
