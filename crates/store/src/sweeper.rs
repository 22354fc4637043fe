//! Background expiry sweeper
//!
//! Periodically removes expired nonces, orders, authorizations, and
//! certificates so transient protocol state does not grow without bound.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info};

use crate::database::{AcmeDatabase, SweepReport};
use crate::error::DatabaseResult;

/// Default sweep interval (5 minutes)
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Minimum sweep interval (1 second)
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Background expiry sweeper
///
/// The store never reads the clock itself; the sweeper supplies the current
/// time on every pass.
pub struct ExpirySweeper {
    database: Arc<dyn AcmeDatabase>,
    interval: Duration,
}

impl ExpirySweeper {
    /// Create a sweeper with the default interval
    pub fn new(database: Arc<dyn AcmeDatabase>) -> Self {
        Self {
            database,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    /// Set the sweep interval
    ///
    /// The interval is clamped to a minimum of 1 second.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_SWEEP_INTERVAL);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a single sweep as of `now`
    pub fn sweep_once(&self, now: DateTime<Utc>) -> DatabaseResult<SweepReport> {
        let report = self.database.remove_expired_records(now)?;

        if report.total() > 0 {
            info!(
                nonces = report.nonces,
                orders = report.orders,
                authorizations = report.authorizations,
                certificates = report.certificates,
                "Removed expired ACME records"
            );
        } else {
            debug!("No expired ACME records");
        }

        Ok(report)
    }

    /// Run the sweep loop
    ///
    /// This runs indefinitely. A failed sweep is logged and retried on the
    /// next tick.
    pub async fn run(self) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Starting ACME expiry sweeper"
        );

        let mut interval = interval(self.interval);

        loop {
            interval.tick().await;

            if let Err(e) = self.sweep_once(Utc::now()) {
                error!(error = %e, "ACME expiry sweep failed");
            }
        }
    }

    /// Spawn the sweep loop on the current tokio runtime
    ///
    /// Abort the returned handle to stop sweeping.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

impl std::fmt::Debug for ExpirySweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpirySweeper")
            .field("interval", &self.interval)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatabaseError;
    use crate::memory::InMemoryDatabase;
    use crate::model::{Certificate, Nonce, Order};
    use acme_common::{
        AccountId, AcmeIdentifier, AuthorizationId, CertificateId, ChallengeId, NonceId, OrderId,
    };
    use chrono::Duration as ChronoDuration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_interval_clamped() {
        let sweeper = ExpirySweeper::new(Arc::new(InMemoryDatabase::new()))
            .with_interval(Duration::from_millis(10));
        assert_eq!(sweeper.interval(), MIN_SWEEP_INTERVAL);

        let sweeper = ExpirySweeper::new(Arc::new(InMemoryDatabase::new()));
        assert_eq!(sweeper.interval(), DEFAULT_SWEEP_INTERVAL);
    }

    #[test]
    fn test_sweep_once_report() {
        let database = Arc::new(InMemoryDatabase::new());
        let now = Utc::now();

        database
            .add_nonce(Nonce::new(NonceId::new("old"), now - ChronoDuration::minutes(1)))
            .unwrap();
        database
            .add_nonce(Nonce::new(NonceId::new("fresh"), now + ChronoDuration::minutes(1)))
            .unwrap();

        let mut order = Order::new(OrderId::new("o1"), AccountId::new("a1"));
        order.expires = Some(now);
        database.add_order(order).unwrap();

        let mut cert = Certificate::new(CertificateId::new("c1"), vec![1, 2, 3]);
        cert.expires = Some(now + ChronoDuration::days(90));
        database.add_certificate(cert.id.clone(), cert).unwrap();

        let sweeper = ExpirySweeper::new(database.clone());
        let report = sweeper.sweep_once(now).unwrap();

        assert_eq!(
            report,
            SweepReport {
                nonces: 1,
                orders: 1,
                authorizations: 0,
                certificates: 0,
            }
        );
        assert_eq!(database.stats().nonces, 1);
        assert_eq!(database.stats().certificates, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_sweeper_removes_expired() {
        let database = Arc::new(InMemoryDatabase::new());
        database
            .add_nonce(Nonce::new(
                NonceId::new("stale"),
                Utc::now() - ChronoDuration::minutes(5),
            ))
            .unwrap();

        let handle = ExpirySweeper::new(database.clone())
            .with_interval(Duration::from_secs(60))
            .spawn();

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(database.stats().nonces, 0);

        handle.abort();
    }

    /// Backend whose sweeps always fail
    struct FailingDatabase {
        attempts: AtomicUsize,
    }

    impl AcmeDatabase for FailingDatabase {
        fn add_nonce(&self, _: Nonce) -> DatabaseResult<()> {
            Ok(())
        }
        fn remove_nonce(&self, _: &NonceId) -> DatabaseResult<Option<Nonce>> {
            Ok(None)
        }
        fn remove_expired_nonces(&self, _: DateTime<Utc>) -> DatabaseResult<usize> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(DatabaseError::Unavailable("backend offline".to_string()))
        }
        fn get_account(&self, _: &AccountId) -> DatabaseResult<Option<crate::model::Account>> {
            Ok(None)
        }
        fn add_account(&self, _: crate::model::Account) -> DatabaseResult<()> {
            Ok(())
        }
        fn update_account(&self, _: crate::model::Account) -> DatabaseResult<()> {
            Ok(())
        }
        fn get_order(&self, _: &OrderId) -> DatabaseResult<Option<Order>> {
            Ok(None)
        }
        fn find_orders_by_authorization_and_status(
            &self,
            _: &AuthorizationId,
            _: crate::status::OrderStatus,
        ) -> DatabaseResult<Vec<Order>> {
            Ok(Vec::new())
        }
        fn find_order_by_certificate(&self, _: &CertificateId) -> DatabaseResult<Option<Order>> {
            Ok(None)
        }
        fn add_order(&self, _: Order) -> DatabaseResult<()> {
            Ok(())
        }
        fn update_order(&self, _: Order) -> DatabaseResult<()> {
            Ok(())
        }
        fn remove_expired_orders(&self, _: DateTime<Utc>) -> DatabaseResult<usize> {
            Ok(0)
        }
        fn get_authorization(
            &self,
            _: &AuthorizationId,
        ) -> DatabaseResult<Option<crate::model::Authorization>> {
            Ok(None)
        }
        fn find_authorization_by_challenge(
            &self,
            _: &ChallengeId,
        ) -> DatabaseResult<Option<crate::model::Authorization>> {
            Ok(None)
        }
        fn find_revocation_authorizations(
            &self,
            _: &AccountId,
            _: DateTime<Utc>,
        ) -> DatabaseResult<Vec<crate::model::Authorization>> {
            Ok(Vec::new())
        }
        fn has_revocation_authorization(
            &self,
            _: &AccountId,
            _: DateTime<Utc>,
            _: &AcmeIdentifier,
        ) -> DatabaseResult<bool> {
            Ok(false)
        }
        fn add_authorization(&self, _: crate::model::Authorization) -> DatabaseResult<()> {
            Ok(())
        }
        fn update_authorization(&self, _: crate::model::Authorization) -> DatabaseResult<()> {
            Ok(())
        }
        fn remove_expired_authorizations(&self, _: DateTime<Utc>) -> DatabaseResult<usize> {
            Ok(0)
        }
        fn get_certificate(&self, _: &CertificateId) -> DatabaseResult<Option<Certificate>> {
            Ok(None)
        }
        fn add_certificate(&self, _: CertificateId, _: Certificate) -> DatabaseResult<()> {
            Ok(())
        }
        fn remove_expired_certificates(&self, _: DateTime<Utc>) -> DatabaseResult<usize> {
            Ok(0)
        }
    }

    #[test]
    fn test_sweep_once_propagates_backend_failure() {
        let database = Arc::new(FailingDatabase {
            attempts: AtomicUsize::new(0),
        });
        let sweeper = ExpirySweeper::new(database);

        let err = sweeper.sweep_once(Utc::now()).unwrap_err();
        assert!(matches!(err, DatabaseError::Unavailable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_keeps_running_after_failure() {
        let database = Arc::new(FailingDatabase {
            attempts: AtomicUsize::new(0),
        });

        let handle = ExpirySweeper::new(database.clone())
            .with_interval(Duration::from_secs(10))
            .spawn();

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert!(database.attempts.load(Ordering::SeqCst) >= 3);

        handle.abort();
    }
}
