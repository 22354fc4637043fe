//! ACME Store Common Types
//!
//! Identifier types shared by every implementation of the ACME state store.
//!
//! - **Entity IDs**: one newtype per stored record kind, so a nonce ID can
//!   never be passed where an order ID is expected
//! - **Identifiers**: the `type` + `value` pair an authorization is issued for,
//!   including the wildcard form used by revocation checks

// ============================================================================
// Module Declarations
// ============================================================================

pub mod identifier;
pub mod ids;

// ============================================================================
// Public API Re-exports
// ============================================================================

pub use identifier::{AcmeIdentifier, DNS_IDENTIFIER_TYPE, IP_IDENTIFIER_TYPE, WILDCARD_PREFIX};
pub use ids::{AccountId, AuthorizationId, CertificateId, ChallengeId, NonceId, OrderId};
