//! ACME identifiers
//!
//! An identifier is the subject an authorization proves control over, such as
//! a DNS name. Equality is exact on both the type and the value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier type for DNS names
pub const DNS_IDENTIFIER_TYPE: &str = "dns";

/// Identifier type for IP addresses
pub const IP_IDENTIFIER_TYPE: &str = "ip";

/// Prefix that turns a base DNS name into its wildcard form
pub const WILDCARD_PREFIX: &str = "*.";

/// An identifier (`type` + `value`) as carried in orders and authorizations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AcmeIdentifier {
    /// Identifier type (e.g., "dns")
    #[serde(rename = "type")]
    pub kind: String,
    /// Identifier value (e.g., "example.com")
    pub value: String,
}

impl AcmeIdentifier {
    /// Create an identifier with an arbitrary type
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// Create a DNS identifier
    pub fn dns(value: impl Into<String>) -> Self {
        Self::new(DNS_IDENTIFIER_TYPE, value)
    }

    /// Check whether this is a DNS identifier
    pub fn is_dns(&self) -> bool {
        self.kind == DNS_IDENTIFIER_TYPE
    }

    /// Get the `*.`-prefixed form of a DNS identifier
    ///
    /// Returns `None` for non-DNS identifiers, which have no wildcard form.
    pub fn to_wildcard(&self) -> Option<Self> {
        if !self.is_dns() {
            return None;
        }

        Some(Self {
            kind: self.kind.clone(),
            value: format!("{}{}", WILDCARD_PREFIX, self.value),
        })
    }
}

impl fmt::Display for AcmeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}
