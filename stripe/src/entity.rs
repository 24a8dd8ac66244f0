//! Shared behavior for API resource types.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StripeError;

/// An object returned by (or sent to) the Stripe API.
///
/// Every resource type implements this trait so callers can move between
/// the typed representation and raw JSON without reaching for
/// `serde_json` directly.
pub trait StripeEntity: Serialize + DeserializeOwned {
    /// Renders the entity as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StripeError::Json`] if serialization fails.
    fn to_json(&self) -> Result<String, StripeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses an entity from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`StripeError::Json`] if the document does not match the entity.
    fn from_json(json: &str) -> Result<Self, StripeError> {
        Ok(serde_json::from_str(json)?)
    }
}
