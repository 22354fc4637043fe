//! Store contract shared by every ACME database backend.

use acme_common::{
    AccountId, AcmeIdentifier, AuthorizationId, CertificateId, ChallengeId, NonceId, OrderId,
};
use chrono::{DateTime, Utc};

use crate::error::DatabaseResult;
use crate::model::{Account, Authorization, Certificate, Nonce, Order};
use crate::status::OrderStatus;

/// Records removed by one pass over every expiring collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub nonces: usize,
    pub orders: usize,
    pub authorizations: usize,
    pub certificates: usize,
}

impl SweepReport {
    /// Total number of records removed
    pub fn total(&self) -> usize {
        self.nonces + self.orders + self.authorizations + self.certificates
    }
}

/// Storage for transient ACME protocol state
///
/// Each collection is independent: there are no cross-collection
/// transactions, so adding an order and its authorizations are separate
/// operations. Lookups return `None` when nothing matches. Errors are
/// reserved for backend failures.
///
/// Expiry-sensitive operations take the current time as a parameter rather
/// than reading a clock.
pub trait AcmeDatabase: Send + Sync {
    /// Prepare the backend for use
    fn init(&self) -> DatabaseResult<()> {
        Ok(())
    }

    // =========================================================================
    // Nonces
    // =========================================================================

    /// Store a nonce, replacing any nonce with the same ID
    fn add_nonce(&self, nonce: Nonce) -> DatabaseResult<()>;

    /// Consume a nonce
    ///
    /// Returns `None` if the nonce was never issued or was already used.
    /// Concurrent removals of the same ID succeed at most once.
    fn remove_nonce(&self, nonce_id: &NonceId) -> DatabaseResult<Option<Nonce>>;

    /// Remove nonces whose expiration is at or before `now`
    fn remove_expired_nonces(&self, now: DateTime<Utc>) -> DatabaseResult<usize>;

    // =========================================================================
    // Accounts
    // =========================================================================

    fn get_account(&self, account_id: &AccountId) -> DatabaseResult<Option<Account>>;

    fn add_account(&self, account: Account) -> DatabaseResult<()>;

    /// Replace the stored account (last write wins)
    fn update_account(&self, account: Account) -> DatabaseResult<()>;

    // =========================================================================
    // Orders
    // =========================================================================

    fn get_order(&self, order_id: &OrderId) -> DatabaseResult<Option<Order>>;

    /// Find orders with the given status that reference `authz_id`
    fn find_orders_by_authorization_and_status(
        &self,
        authz_id: &AuthorizationId,
        status: OrderStatus,
    ) -> DatabaseResult<Vec<Order>>;

    /// Same as [`find_orders_by_authorization_and_status`] for a status given
    /// as text
    ///
    /// Fails with [`DatabaseError::InvalidStatus`] if `status` is not a
    /// canonical order status.
    ///
    /// [`find_orders_by_authorization_and_status`]: AcmeDatabase::find_orders_by_authorization_and_status
    /// [`DatabaseError::InvalidStatus`]: crate::DatabaseError::InvalidStatus
    fn find_orders_by_authorization_and_status_str(
        &self,
        authz_id: &AuthorizationId,
        status: &str,
    ) -> DatabaseResult<Vec<Order>> {
        let status: OrderStatus = status.parse()?;
        self.find_orders_by_authorization_and_status(authz_id, status)
    }

    /// Find the order that produced a certificate
    ///
    /// Nothing prevents two orders from naming the same certificate; if that
    /// happens either one may be returned.
    fn find_order_by_certificate(&self, cert_id: &CertificateId) -> DatabaseResult<Option<Order>>;

    fn add_order(&self, order: Order) -> DatabaseResult<()>;

    /// Replace the stored order (last write wins)
    fn update_order(&self, order: Order) -> DatabaseResult<()>;

    /// Remove orders whose expiration is at or before `now`
    fn remove_expired_orders(&self, now: DateTime<Utc>) -> DatabaseResult<usize>;

    // =========================================================================
    // Authorizations
    // =========================================================================

    fn get_authorization(
        &self,
        authz_id: &AuthorizationId,
    ) -> DatabaseResult<Option<Authorization>>;

    /// Find the authorization embedding the given challenge
    fn find_authorization_by_challenge(
        &self,
        challenge_id: &ChallengeId,
    ) -> DatabaseResult<Option<Authorization>>;

    /// Find the account's valid authorizations still in force after `as_of`
    ///
    /// An authorization expiring exactly at `as_of` is excluded.
    fn find_revocation_authorizations(
        &self,
        account_id: &AccountId,
        as_of: DateTime<Utc>,
    ) -> DatabaseResult<Vec<Authorization>>;

    /// Check whether the account may revoke a certificate for `identifier`
    ///
    /// Uses the same filter as [`find_revocation_authorizations`]; a wildcard
    /// DNS authorization for `example.com` matches `*.example.com`.
    ///
    /// [`find_revocation_authorizations`]: AcmeDatabase::find_revocation_authorizations
    fn has_revocation_authorization(
        &self,
        account_id: &AccountId,
        as_of: DateTime<Utc>,
        identifier: &AcmeIdentifier,
    ) -> DatabaseResult<bool>;

    fn add_authorization(&self, authorization: Authorization) -> DatabaseResult<()>;

    /// Replace the stored authorization (last write wins)
    fn update_authorization(&self, authorization: Authorization) -> DatabaseResult<()>;

    /// Remove authorizations whose expiration is at or before `now`
    fn remove_expired_authorizations(&self, now: DateTime<Utc>) -> DatabaseResult<usize>;

    // =========================================================================
    // Certificates
    // =========================================================================

    fn get_certificate(&self, cert_id: &CertificateId) -> DatabaseResult<Option<Certificate>>;

    /// Store a certificate under a caller-chosen ID
    fn add_certificate(
        &self,
        cert_id: CertificateId,
        certificate: Certificate,
    ) -> DatabaseResult<()>;

    /// Remove certificates whose expiration is at or before `now`
    fn remove_expired_certificates(&self, now: DateTime<Utc>) -> DatabaseResult<usize>;

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Run every expiry sweep with the same `now`
    ///
    /// Accounts are never swept.
    fn remove_expired_records(&self, now: DateTime<Utc>) -> DatabaseResult<SweepReport> {
        Ok(SweepReport {
            nonces: self.remove_expired_nonces(now)?,
            orders: self.remove_expired_orders(now)?,
            authorizations: self.remove_expired_authorizations(now)?,
            certificates: self.remove_expired_certificates(now)?,
        })
    }
}
