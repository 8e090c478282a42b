//! # Payment Detection Subsystem (rq-03)
//!
//! Detects payments made to requests carrying the
//! `pn-any-erc20-conversion-fee-proxy-contract` extension and computes
//! their balance.
//!
//! ## Flow
//!
//! ```text
//! Request ──→ ConversionFeeProxyDetector ──→ BalanceSource (payments, refunds)
//!                                               │
//!                                               ↓
//!                                    ConversionInfoRetriever ──→ LedgerProvider
//!                                     (pair by tx hash, filter,     (logs, block
//!                                      unpad, timestamp)             timestamps)
//! ```
//!
//! ## Architecture
//!
//! - `domain/` - logs and proxy events, payment events, references, balances
//! - `ports/` - detector API, ledger and balance-source traits
//! - `adapters/` - in-memory ledger
//! - `service/` - retriever, ledger balance source, detector
//! - `config` - proxy deployments and detection defaults

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::MockLedger;
pub use config::{ConversionFeeProxyConfig, ProxyDeployment};
pub use domain::*;
pub use ports::{BalanceSource, LedgerProvider, PaymentNetworkApi};
pub use service::{ConversionFeeProxyDetector, ConversionInfoRetriever, LedgerBalanceSource};
