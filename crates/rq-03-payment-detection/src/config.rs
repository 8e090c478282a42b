//! # Payment Detection Configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{Address, BlockNumber};

/// Default rate-timespan ceiling when the extension sets none.
pub const DEFAULT_MAX_RATE_TIMESPAN: u64 = 0;

/// Default number of block lookups in flight per retrieval.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 5;

/// Where the conversion proxy lives on one network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyDeployment {
    pub address: Address,
    /// Logs are searched from this block on.
    pub creation_block: BlockNumber,
}

/// Conversion fee-proxy detection configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionFeeProxyConfig {
    /// Network name → deployment.
    pub deployments: BTreeMap<String, ProxyDeployment>,

    /// Rate-timespan ceiling used when the extension has no
    /// `maxRateTimespan`. Events declaring a larger timespan are ignored.
    pub max_rate_timespan: u64,

    /// Upper bound on concurrent ledger calls within one retrieval.
    pub max_concurrent_requests: usize,
}

impl Default for ConversionFeeProxyConfig {
    fn default() -> Self {
        let mut deployments = BTreeMap::new();
        deployments.insert(
            "private".to_string(),
            ProxyDeployment {
                address: Address::from_slice(&[
                    0xde, 0x54, 0x91, 0xf7, 0x74, 0xf0, 0xcb, 0x00, 0x9a, 0xbc, 0xea, 0x73, 0x26,
                    0x34, 0x2e, 0x10, 0x5d, 0xbb, 0x1b, 0x2e,
                ]),
                creation_block: 0,
            },
        );
        Self {
            deployments,
            max_rate_timespan: DEFAULT_MAX_RATE_TIMESPAN,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

impl ConversionFeeProxyConfig {
    /// Create a config for testing: one `private` deployment at a fixed
    /// address, created at block 1.
    pub fn for_testing() -> Self {
        let mut deployments = BTreeMap::new();
        deployments.insert(
            "private".to_string(),
            ProxyDeployment {
                address: Address::repeat_byte(0xcc),
                creation_block: 1,
            },
        );
        Self {
            deployments,
            max_rate_timespan: DEFAULT_MAX_RATE_TIMESPAN,
            max_concurrent_requests: 2,
        }
    }

    pub fn with_deployment(mut self, network: &str, deployment: ProxyDeployment) -> Self {
        self.deployments.insert(network.to_string(), deployment);
        self
    }

    pub fn deployment(&self, network: &str) -> Option<&ProxyDeployment> {
        self.deployments.get(network)
    }
}
