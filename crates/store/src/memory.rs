//! In-memory ACME database
//!
//! Holds every collection in its own [`DashMap`], so operations on different
//! collections never contend and each record is read or replaced as a whole.
//! State lives for the lifetime of the process only.

use acme_common::{
    AccountId, AcmeIdentifier, AuthorizationId, CertificateId, ChallengeId, NonceId, OrderId,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info, trace};

use crate::database::AcmeDatabase;
use crate::error::DatabaseResult;
use crate::model::{Account, Authorization, Certificate, Nonce, Order};
use crate::status::{AuthorizationStatus, OrderStatus};

/// Number of records currently held per collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatabaseStats {
    pub nonces: usize,
    pub accounts: usize,
    pub orders: usize,
    pub authorizations: usize,
    pub certificates: usize,
}

/// Volatile ACME state store
///
/// # Thread Safety
///
/// Every collection is a `DashMap`. Whole-collection scans (the `find_*`
/// queries and expiry sweeps) see each record consistently but may interleave
/// with concurrent writes to other records of the same collection.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    nonces: DashMap<NonceId, Nonce>,
    accounts: DashMap<AccountId, Account>,
    orders: DashMap<OrderId, Order>,
    authorizations: DashMap<AuthorizationId, Authorization>,
    certificates: DashMap<CertificateId, Certificate>,
}

impl InMemoryDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Current record counts
    pub fn stats(&self) -> DatabaseStats {
        DatabaseStats {
            nonces: self.nonces.len(),
            accounts: self.accounts.len(),
            orders: self.orders.len(),
            authorizations: self.authorizations.len(),
            certificates: self.certificates.len(),
        }
    }

    /// Apply the revocation filter (owner, `valid` status, strict expiry)
    fn is_revocation_candidate(
        authorization: &Authorization,
        account_id: &AccountId,
        as_of: DateTime<Utc>,
    ) -> bool {
        if &authorization.account_id != account_id {
            return false;
        }

        if authorization.status != AuthorizationStatus::Valid {
            debug!(
                authz_id = %authorization.id,
                status = %authorization.status,
                "Authorization is not valid"
            );
            return false;
        }

        if !authorization.is_unexpired_after(as_of) {
            debug!(authz_id = %authorization.id, "Authorization has expired");
            return false;
        }

        true
    }
}

/// Remove every entry matching `expired`, returning how many were removed
fn sweep<K, V>(map: &DashMap<K, V>, mut expired: impl FnMut(&V) -> bool) -> usize
where
    K: Eq + std::hash::Hash,
{
    let mut removed = 0usize;
    map.retain(|_, value| {
        if expired(value) {
            removed += 1;
            false
        } else {
            true
        }
    });
    removed
}

impl AcmeDatabase for InMemoryDatabase {
    fn init(&self) -> DatabaseResult<()> {
        info!("Initializing in-memory database");
        Ok(())
    }

    // =========================================================================
    // Nonces
    // =========================================================================

    fn add_nonce(&self, nonce: Nonce) -> DatabaseResult<()> {
        trace!(nonce_id = %nonce.id, expires = %nonce.expires, "Adding nonce");
        self.nonces.insert(nonce.id.clone(), nonce);
        Ok(())
    }

    fn remove_nonce(&self, nonce_id: &NonceId) -> DatabaseResult<Option<Nonce>> {
        let removed = self.nonces.remove(nonce_id).map(|(_, nonce)| nonce);
        if removed.is_none() {
            debug!(nonce_id = %nonce_id, "Nonce not found or already used");
        }
        Ok(removed)
    }

    fn remove_expired_nonces(&self, now: DateTime<Utc>) -> DatabaseResult<usize> {
        let removed = sweep(&self.nonces, |nonce| nonce.is_expired_at(now));
        if removed > 0 {
            debug!(removed = removed, "Removed expired nonces");
        }
        Ok(removed)
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    fn get_account(&self, account_id: &AccountId) -> DatabaseResult<Option<Account>> {
        Ok(self.accounts.get(account_id).map(|a| a.value().clone()))
    }

    fn add_account(&self, account: Account) -> DatabaseResult<()> {
        debug!(account_id = %account.id, "Adding account");
        self.accounts.insert(account.id.clone(), account);
        Ok(())
    }

    fn update_account(&self, account: Account) -> DatabaseResult<()> {
        debug!(account_id = %account.id, status = %account.status, "Updating account");
        self.accounts.insert(account.id.clone(), account);
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    fn get_order(&self, order_id: &OrderId) -> DatabaseResult<Option<Order>> {
        Ok(self.orders.get(order_id).map(|o| o.value().clone()))
    }

    fn find_orders_by_authorization_and_status(
        &self,
        authz_id: &AuthorizationId,
        status: OrderStatus,
    ) -> DatabaseResult<Vec<Order>> {
        let results: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| {
                let order = entry.value();
                order.status == status && order.references_authorization(authz_id)
            })
            .map(|entry| entry.value().clone())
            .collect();

        trace!(
            authz_id = %authz_id,
            status = %status,
            matches = results.len(),
            "Looked up orders by authorization"
        );
        Ok(results)
    }

    fn find_order_by_certificate(&self, cert_id: &CertificateId) -> DatabaseResult<Option<Order>> {
        let found = self
            .orders
            .iter()
            .find(|entry| entry.value().certificate_id.as_ref() == Some(cert_id))
            .map(|entry| entry.value().clone());

        if found.is_none() {
            trace!(cert_id = %cert_id, "No order found for certificate");
        }
        Ok(found)
    }

    fn add_order(&self, order: Order) -> DatabaseResult<()> {
        debug!(order_id = %order.id, account_id = %order.account_id, "Adding order");
        self.orders.insert(order.id.clone(), order);
        Ok(())
    }

    fn update_order(&self, order: Order) -> DatabaseResult<()> {
        debug!(order_id = %order.id, status = %order.status, "Updating order");
        self.orders.insert(order.id.clone(), order);
        Ok(())
    }

    fn remove_expired_orders(&self, now: DateTime<Utc>) -> DatabaseResult<usize> {
        let removed = sweep(&self.orders, |order| order.is_expired_at(now));
        if removed > 0 {
            debug!(removed = removed, "Removed expired orders");
        }
        Ok(removed)
    }

    // =========================================================================
    // Authorizations
    // =========================================================================

    fn get_authorization(
        &self,
        authz_id: &AuthorizationId,
    ) -> DatabaseResult<Option<Authorization>> {
        Ok(self.authorizations.get(authz_id).map(|a| a.value().clone()))
    }

    fn find_authorization_by_challenge(
        &self,
        challenge_id: &ChallengeId,
    ) -> DatabaseResult<Option<Authorization>> {
        Ok(self
            .authorizations
            .iter()
            .find(|entry| entry.value().challenge(challenge_id).is_some())
            .map(|entry| entry.value().clone()))
    }

    fn find_revocation_authorizations(
        &self,
        account_id: &AccountId,
        as_of: DateTime<Utc>,
    ) -> DatabaseResult<Vec<Authorization>> {
        Ok(self
            .authorizations
            .iter()
            .filter(|entry| Self::is_revocation_candidate(entry.value(), account_id, as_of))
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn has_revocation_authorization(
        &self,
        account_id: &AccountId,
        as_of: DateTime<Utc>,
        identifier: &AcmeIdentifier,
    ) -> DatabaseResult<bool> {
        for entry in self.authorizations.iter() {
            let authorization = entry.value();

            if !Self::is_revocation_candidate(authorization, account_id, as_of) {
                continue;
            }

            if &authorization.effective_identifier() != identifier {
                debug!(
                    authz_id = %authorization.id,
                    identifier = %identifier,
                    "Authorization does not match identifier"
                );
                continue;
            }

            return Ok(true);
        }

        Ok(false)
    }

    fn add_authorization(&self, authorization: Authorization) -> DatabaseResult<()> {
        debug!(
            authz_id = %authorization.id,
            identifier = %authorization.identifier,
            wildcard = authorization.wildcard,
            "Adding authorization"
        );
        self.authorizations.insert(authorization.id.clone(), authorization);
        Ok(())
    }

    fn update_authorization(&self, authorization: Authorization) -> DatabaseResult<()> {
        debug!(
            authz_id = %authorization.id,
            status = %authorization.status,
            "Updating authorization"
        );
        self.authorizations.insert(authorization.id.clone(), authorization);
        Ok(())
    }

    fn remove_expired_authorizations(&self, now: DateTime<Utc>) -> DatabaseResult<usize> {
        let removed = sweep(&self.authorizations, |authz| authz.is_expired_at(now));
        if removed > 0 {
            debug!(removed = removed, "Removed expired authorizations");
        }
        Ok(removed)
    }

    // =========================================================================
    // Certificates
    // =========================================================================

    fn get_certificate(&self, cert_id: &CertificateId) -> DatabaseResult<Option<Certificate>> {
        Ok(self.certificates.get(cert_id).map(|c| c.value().clone()))
    }

    fn add_certificate(
        &self,
        cert_id: CertificateId,
        certificate: Certificate,
    ) -> DatabaseResult<()> {
        debug!(cert_id = %cert_id, "Adding certificate");
        self.certificates.insert(cert_id, certificate);
        Ok(())
    }

    fn remove_expired_certificates(&self, now: DateTime<Utc>) -> DatabaseResult<usize> {
        let removed = sweep(&self.certificates, |cert| cert.is_expired_at(now));
        if removed > 0 {
            debug!(removed = removed, "Removed expired certificates");
        }
        Ok(removed)
    }
}
