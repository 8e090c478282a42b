//! # Data Access Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default delay between two automatic synchronizations.
pub const DEFAULT_SYNCHRONIZATION_INTERVAL_MS: u64 = 10_000;

/// Default number of attempts per synchronization tick.
pub const DEFAULT_MAX_SYNC_RETRIES: u32 = 5;

/// Default number of storage reads in flight per query.
pub const DEFAULT_MAX_CONCURRENT_READS: usize = 5;

/// Data Access configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataAccessConfig {
    /// Delay between two automatic synchronizations, in milliseconds.
    pub synchronization_interval_ms: u64,

    /// Attempts per synchronization tick before the failure is logged and
    /// deferred to the next interval.
    pub max_sync_retries: u32,

    /// Upper bound on concurrent `Storage::read` calls within one query.
    pub max_concurrent_reads: usize,
}

impl Default for DataAccessConfig {
    fn default() -> Self {
        Self {
            synchronization_interval_ms: DEFAULT_SYNCHRONIZATION_INTERVAL_MS,
            max_sync_retries: DEFAULT_MAX_SYNC_RETRIES,
            max_concurrent_reads: DEFAULT_MAX_CONCURRENT_READS,
        }
    }
}

impl DataAccessConfig {
    /// Create a config for testing (short interval, single attempt).
    pub fn for_testing() -> Self {
        Self {
            synchronization_interval_ms: 100,
            max_sync_retries: 1,
            max_concurrent_reads: 2,
        }
    }

    pub fn synchronization_interval(&self) -> Duration {
        Duration::from_millis(self.synchronization_interval_ms)
    }
}
