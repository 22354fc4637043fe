//! Type-safe identifier newtypes for stored ACME records.
//!
//! Every record kind is keyed by a string, but the kinds are never
//! interchangeable: an order refers to its authorizations by
//! [`AuthorizationId`], an authorization to its owner by [`AccountId`], and so
//! on. Distinct types turn a mixed-up foreign key into a compile error.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from an existing string
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Create a new random ID
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert to owned String
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

record_id! {
    /// Anti-replay nonce identifier.
    ///
    /// Handed out in the `Replay-Nonce` header and consumed by the next
    /// signed request that echoes it.
    NonceId
}

record_id! {
    /// Registered client account identifier.
    AccountId
}

record_id! {
    /// Certificate order identifier.
    OrderId
}

record_id! {
    /// Authorization identifier.
    ///
    /// Orders reference their authorizations by this ID.
    AuthorizationId
}

record_id! {
    /// Challenge identifier, unique within the authorization that embeds it.
    ChallengeId
}

record_id! {
    /// Issued certificate identifier.
    CertificateId
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_generated_ids_differ() {
        let id1 = NonceId::generate();
        let id2 = NonceId::generate();

        assert_ne!(id1, id2);
        assert!(Uuid::parse_str(id1.as_str()).is_ok());
    }

    #[test]
    fn test_order_id() {
        let id = OrderId::new("order-1");
        assert_eq!(id.as_str(), "order-1");
        assert_eq!(id.to_string(), "order-1");
        assert_eq!(id.into_string(), "order-1".to_string());
    }

    #[test]
    fn test_from_conversions() {
        let from_str: AccountId = "acct".into();
        let from_string: AccountId = String::from("acct").into();
        assert_eq!(from_str, from_string);
    }

    #[test]
    fn test_borrowed_lookup() {
        let mut map = HashMap::new();
        map.insert(CertificateId::new("cert-1"), 1);

        assert_eq!(map.get("cert-1"), Some(&1));
        assert_eq!(map.get("cert-2"), None);
    }

    #[test]
    fn test_serde_transparent() {
        let id = AuthorizationId::new("authz-9");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"authz-9\"");

        let parsed: AuthorizationId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
