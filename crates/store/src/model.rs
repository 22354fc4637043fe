//! Stored ACME records
//!
//! Records are plain values, replaced wholesale on update. Relationships
//! between them are foreign IDs (an order lists [`AuthorizationId`]s, an
//! authorization names its [`AccountId`]) resolved through the store, never
//! embedded references.
//!
//! # Expiration
//!
//! A record with an expiration time is expired once `now` has reached it:
//! `expires <= now`. Records without an expiration never expire.

use acme_common::{
    AccountId, AcmeIdentifier, AuthorizationId, CertificateId, ChallengeId, NonceId, OrderId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::{AccountStatus, AuthorizationStatus, ChallengeStatus, OrderStatus};

/// Check the sweep rule for an optional expiration time
fn expired_at(expires: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expires.is_some_and(|expires| expires <= now)
}

// =========================================================================
// Nonce
// =========================================================================

/// Single-use anti-replay token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nonce {
    pub id: NonceId,
    /// When the nonce stops being accepted
    pub expires: DateTime<Utc>,
}

impl Nonce {
    pub fn new(id: NonceId, expires: DateTime<Utc>) -> Self {
        Self { id, expires }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }
}

// =========================================================================
// Account
// =========================================================================

/// Registered client account
///
/// Contact and key material are opaque to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub status: AccountStatus,
    /// Contact URLs (e.g., "mailto:admin@example.com")
    #[serde(default)]
    pub contact: Vec<String>,
    #[serde(default)]
    pub terms_of_service_agreed: bool,
    /// Account public key as a JWK
    #[serde(default)]
    pub jwk: Option<serde_json::Value>,
}

impl Account {
    /// Create a valid account with no contact information
    pub fn new(id: AccountId) -> Self {
        Self {
            id,
            status: AccountStatus::Valid,
            contact: Vec::new(),
            terms_of_service_agreed: false,
            jwk: None,
        }
    }
}

// =========================================================================
// Order
// =========================================================================

/// Certificate request in progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub account_id: AccountId,
    pub status: OrderStatus,
    /// Identifiers the certificate will cover
    #[serde(default)]
    pub identifiers: Vec<AcmeIdentifier>,
    /// Authorizations that must be valid before finalization
    #[serde(default)]
    pub authorization_ids: Vec<AuthorizationId>,
    /// Issued certificate, once the order is valid
    #[serde(default)]
    pub certificate_id: Option<CertificateId>,
    #[serde(default)]
    pub not_before: Option<DateTime<Utc>>,
    #[serde(default)]
    pub not_after: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
    /// Problem document describing why the order failed
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl Order {
    /// Create a pending order with no identifiers or authorizations
    pub fn new(id: OrderId, account_id: AccountId) -> Self {
        Self {
            id,
            account_id,
            status: OrderStatus::Pending,
            identifiers: Vec::new(),
            authorization_ids: Vec::new(),
            certificate_id: None,
            not_before: None,
            not_after: None,
            expires: None,
            error: None,
        }
    }

    /// Check whether this order references the given authorization
    pub fn references_authorization(&self, authz_id: &AuthorizationId) -> bool {
        self.authorization_ids.iter().any(|id| id == authz_id)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        expired_at(self.expires, now)
    }
}

// =========================================================================
// Authorization
// =========================================================================

/// Proof that an account controls an identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authorization {
    pub id: AuthorizationId,
    /// Owning account
    pub account_id: AccountId,
    pub status: AuthorizationStatus,
    pub identifier: AcmeIdentifier,
    /// Whether this authorization covers `*.` + the identifier value
    #[serde(default)]
    pub wildcard: bool,
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
    #[serde(default)]
    pub challenges: Vec<Challenge>,
}

impl Authorization {
    /// Create a pending, non-wildcard authorization with no challenges
    pub fn new(id: AuthorizationId, account_id: AccountId, identifier: AcmeIdentifier) -> Self {
        Self {
            id,
            account_id,
            status: AuthorizationStatus::Pending,
            identifier,
            wildcard: false,
            expires: None,
            challenges: Vec::new(),
        }
    }

    /// Find an embedded challenge by ID
    pub fn challenge(&self, challenge_id: &ChallengeId) -> Option<&Challenge> {
        self.challenges.iter().find(|c| &c.id == challenge_id)
    }

    /// The identifier this authorization satisfies
    ///
    /// For a wildcard DNS authorization this is the `*.`-prefixed form, so
    /// `example.com` with `wildcard` set matches `*.example.com` and nothing
    /// else.
    pub fn effective_identifier(&self) -> AcmeIdentifier {
        if self.wildcard {
            if let Some(wildcard) = self.identifier.to_wildcard() {
                return wildcard;
            }
        }
        self.identifier.clone()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        expired_at(self.expires, now)
    }

    /// Check whether this authorization is still in force at `as_of`
    ///
    /// Unlike the sweep rule this is strict: an authorization expiring
    /// exactly at `as_of` no longer counts.
    pub fn is_unexpired_after(&self, as_of: DateTime<Utc>) -> bool {
        self.expires.is_none_or(|expires| expires > as_of)
    }
}

/// One way of proving an authorization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: ChallengeId,
    pub authorization_id: AuthorizationId,
    /// Challenge type (e.g., "http-01", "dns-01")
    #[serde(rename = "type")]
    pub kind: String,
    pub token: String,
    pub status: ChallengeStatus,
    #[serde(default)]
    pub validated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl Challenge {
    /// Create a pending challenge
    pub fn new(
        id: ChallengeId,
        authorization_id: AuthorizationId,
        kind: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            id,
            authorization_id,
            kind: kind.into(),
            token: token.into(),
            status: ChallengeStatus::Pending,
            validated: None,
            error: None,
        }
    }
}

// =========================================================================
// Certificate
// =========================================================================

/// Issued certificate record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: CertificateId,
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
    /// Encoded certificate (opaque to the store)
    pub data: Vec<u8>,
}

impl Certificate {
    pub fn new(id: CertificateId, data: Vec<u8>) -> Self {
        Self {
            id,
            expires: None,
            data,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        expired_at(self.expires, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_nonce_expired_at_boundary() {
        let nonce = Nonce::new(NonceId::new("n1"), now());
        assert!(nonce.is_expired_at(now()));
        assert!(!nonce.is_expired_at(now() - Duration::milliseconds(1)));
    }

    #[test]
    fn test_order_without_expiration_never_expires() {
        let order = Order::new(OrderId::new("o1"), AccountId::new("a1"));
        assert!(!order.is_expired_at(now() + Duration::days(3650)));
    }

    #[test]
    fn test_authorization_revocation_boundary_is_strict() {
        let mut authz = Authorization::new(
            AuthorizationId::new("z1"),
            AccountId::new("a1"),
            AcmeIdentifier::dns("example.com"),
        );
        authz.expires = Some(now());

        assert!(!authz.is_unexpired_after(now()));
        assert!(authz.is_unexpired_after(now() - Duration::milliseconds(1)));
        assert!(authz.is_expired_at(now()));

        authz.expires = None;
        assert!(authz.is_unexpired_after(now()));
    }

    #[test]
    fn test_effective_identifier() {
        let mut authz = Authorization::new(
            AuthorizationId::new("z1"),
            AccountId::new("a1"),
            AcmeIdentifier::dns("example.com"),
        );
        assert_eq!(
            authz.effective_identifier(),
            AcmeIdentifier::dns("example.com")
        );

        authz.wildcard = true;
        assert_eq!(
            authz.effective_identifier(),
            AcmeIdentifier::dns("*.example.com")
        );
    }

    #[test]
    fn test_wildcard_flag_ignored_for_non_dns() {
        let mut authz = Authorization::new(
            AuthorizationId::new("z1"),
            AccountId::new("a1"),
            AcmeIdentifier::new("ip", "192.0.2.1"),
        );
        authz.wildcard = true;

        assert_eq!(
            authz.effective_identifier(),
            AcmeIdentifier::new("ip", "192.0.2.1")
        );
    }

    #[test]
    fn test_challenge_lookup() {
        let authz_id = AuthorizationId::new("z1");
        let mut authz = Authorization::new(
            authz_id.clone(),
            AccountId::new("a1"),
            AcmeIdentifier::dns("example.com"),
        );
        authz.challenges.push(Challenge::new(
            ChallengeId::new("c1"),
            authz_id,
            "http-01",
            "token",
        ));

        assert!(authz.challenge(&ChallengeId::new("c1")).is_some());
        assert!(authz.challenge(&ChallengeId::new("c2")).is_none());
    }

    #[test]
    fn test_order_deserializes_with_defaults() {
        let json = r#"{"id":"o1","account_id":"a1","status":"ready"}"#;
        let order: Order = serde_json::from_str(json).unwrap();

        assert_eq!(order.status, OrderStatus::Ready);
        assert!(order.authorization_ids.is_empty());
        assert!(order.certificate_id.is_none());
    }
}
