//! # Adapters

pub mod mock_ledger;

pub use mock_ledger::{tx_hash, MockLedger};
