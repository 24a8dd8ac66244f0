//! Country-specific options attached to a tax registration.
//!
//! Mirrors the `country_options` sub-objects of the
//! [Tax Registration](https://docs.stripe.com/api/tax/registrations/object)
//! resource.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::entity::StripeEntity;

/// Registration options for Spain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationCountryOptionsEs {
    /// Options for a `standard` registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<RegistrationCountryOptionsEsStandard>,

    /// Type of registration in an EU country.
    #[serde(rename = "type")]
    pub kind: EuRegistrationType,
}

impl StripeEntity for RegistrationCountryOptionsEs {}

/// Options for a standard registration in Spain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationCountryOptionsEsStandard {
    /// Place of supply scheme used in an EU standard registration.
    pub place_of_supply_scheme: PlaceOfSupplyScheme,
}

impl StripeEntity for RegistrationCountryOptionsEsStandard {}

/// Type of registration in an EU country.
///
/// Values the API introduces after this SDK was generated are kept
/// verbatim in [`EuRegistrationType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum EuRegistrationType {
    /// Import One-Stop-Shop.
    Ioss,
    /// One-Stop-Shop for sellers established outside the EU.
    OssNonUnion,
    /// One-Stop-Shop for sellers established inside the EU.
    OssUnion,
    /// Regular domestic registration.
    Standard,
    /// Unrecognized value.
    Other(String),
}

impl EuRegistrationType {
    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ioss => "ioss",
            Self::OssNonUnion => "oss_non_union",
            Self::OssUnion => "oss_union",
            Self::Standard => "standard",
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for EuRegistrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EuRegistrationType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ioss" => Self::Ioss,
            "oss_non_union" => Self::OssNonUnion,
            "oss_union" => Self::OssUnion,
            "standard" => Self::Standard,
            other => Self::Other(other.to_owned()),
        })
    }
}

/// Place of supply scheme for an EU standard registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum PlaceOfSupplyScheme {
    /// Cross-border sales under the EU small-seller threshold.
    SmallSeller,
    /// Standard place of supply rules.
    Standard,
    /// Unrecognized value.
    Other(String),
}

impl PlaceOfSupplyScheme {
    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::SmallSeller => "small_seller",
            Self::Standard => "standard",
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for PlaceOfSupplyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaceOfSupplyScheme {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "small_seller" => Self::SmallSeller,
            "standard" => Self::Standard,
            other => Self::Other(other.to_owned()),
        })
    }
}
