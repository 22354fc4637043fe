//! Configuration schema for the ACME state store.
//!
//! ```toml
//! [database]
//! type = "in-memory"
//!
//! [sweep]
//! enabled = true
//! interval-secs = 300
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::database::AcmeDatabase;
use crate::error::{ConfigError, ConfigResult};
use crate::memory::InMemoryDatabase;
use crate::sweeper::{ExpirySweeper, MIN_SWEEP_INTERVAL};

/// Root configuration for the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct StoreConfig {
    /// Backend selection.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Expiry sweep settings.
    #[serde(default)]
    pub sweep: SweepConfig,
}

/// Database backend configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DatabaseConfig {
    /// Volatile store, lost on restart.
    #[default]
    InMemory,
}

/// Expiry sweep configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SweepConfig {
    /// Whether to run the background sweeper.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds between sweeps.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            interval_secs: default_interval_secs(),
        }
    }
}

impl SweepConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

fn default_true() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    300
} // 5 minutes

impl StoreConfig {
    /// Parse and validate a TOML configuration.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: StoreConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.sweep.enabled && self.sweep.interval() < MIN_SWEEP_INTERVAL {
            return Err(ConfigError::Invalid(format!(
                "sweep.interval-secs must be at least {}",
                MIN_SWEEP_INTERVAL.as_secs()
            )));
        }
        Ok(())
    }

    /// Open and initialize the configured database.
    pub fn open_database(&self) -> ConfigResult<Arc<dyn AcmeDatabase>> {
        let database: Arc<dyn AcmeDatabase> = match self.database {
            DatabaseConfig::InMemory => Arc::new(InMemoryDatabase::new()),
        };
        database.init()?;

        info!(backend = ?self.database, "Opened ACME database");
        Ok(database)
    }

    /// Build the sweeper for a database, if sweeping is enabled.
    pub fn sweeper(&self, database: Arc<dyn AcmeDatabase>) -> Option<ExpirySweeper> {
        self.sweep
            .enabled
            .then(|| ExpirySweeper::new(database).with_interval(self.sweep.interval()))
    }
}
