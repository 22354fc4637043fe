//! Status enumerations for stored records.
//!
//! Each record kind has its own closed set of statuses. The canonical string
//! encodings are the lowercase names used on the ACME wire; `as_str`,
//! `FromStr`, `Display`, and serde all agree on them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StatusParseError;

macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// All statuses, in lifecycle order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical string encoding
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = StatusParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    _ => Err(StatusParseError {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

status_enum! {
    /// Account status
    AccountStatus, "account" {
        Valid => "valid",
        /// Deactivated by the client
        Deactivated => "deactivated",
        /// Revoked by the server
        Revoked => "revoked",
    }
}

status_enum! {
    /// Order status
    OrderStatus, "order" {
        /// Authorizations not yet satisfied
        Pending => "pending",
        /// Ready for finalization
        Ready => "ready",
        /// Certificate being issued
        Processing => "processing",
        /// Certificate issued
        Valid => "valid",
        Invalid => "invalid",
    }
}

status_enum! {
    /// Authorization status
    AuthorizationStatus, "authorization" {
        Pending => "pending",
        Valid => "valid",
        Invalid => "invalid",
        Deactivated => "deactivated",
        Expired => "expired",
        Revoked => "revoked",
    }
}

status_enum! {
    /// Challenge status
    ChallengeStatus, "challenge" {
        Pending => "pending",
        Processing => "processing",
        Valid => "valid",
        Invalid => "invalid",
    }
}
