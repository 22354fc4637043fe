//! ACME State Store
//!
//! Transient storage for the short-lived objects an ACME server tracks while
//! a certificate request is in progress: nonces, accounts, orders,
//! authorizations, and certificates.
//!
//! - **Store contract**: [`AcmeDatabase`], implemented by every backend
//! - **In-memory backend**: [`InMemoryDatabase`], a volatile store with one
//!   concurrent map per collection
//! - **Expiry**: [`ExpirySweeper`] periodically removes records whose
//!   expiration has passed
//! - **Configuration**: [`StoreConfig`], loaded from TOML
//!
//! # Example
//!
//! ```ignore
//! use acme_store::{AcmeDatabase, StoreConfig};
//!
//! let config = StoreConfig::load(Path::new("/etc/acme/store.toml"))?;
//! let database = config.open_database()?;
//!
//! if let Some(sweeper) = config.sweeper(database.clone()) {
//!     sweeper.spawn();
//! }
//!
//! // Consume a nonce from an incoming request
//! if database.remove_nonce(&nonce_id)?.is_none() {
//!     return Err(bad_nonce());
//! }
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod config;
pub mod database;
pub mod error;
pub mod memory;
pub mod model;
pub mod status;
pub mod sweeper;

// ============================================================================
// Public API Re-exports
// ============================================================================

// Store contract
pub use database::{AcmeDatabase, SweepReport};
pub use memory::{DatabaseStats, InMemoryDatabase};

// Records
pub use model::{Account, Authorization, Certificate, Challenge, Nonce, Order};
pub use status::{AccountStatus, AuthorizationStatus, ChallengeStatus, OrderStatus};

// Errors
pub use error::{ConfigError, ConfigResult, DatabaseError, DatabaseResult, StatusParseError};

// Configuration and maintenance
pub use config::{DatabaseConfig, StoreConfig, SweepConfig};
pub use sweeper::ExpirySweeper;

pub use acme_common::{
    AccountId, AcmeIdentifier, AuthorizationId, CertificateId, ChallengeId, NonceId, OrderId,
};
