//! # In-Memory Ledger
//!
//! Holds logs and block timestamps pushed by the caller and answers log
//! queries with [`LogFilter::matches`]. Used by tests and local setups.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{keccak256, Timestamp};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::domain::{
    event_topic, payment_reference_topic, Address, BlockNumber, ConversionTransfer,
    FeeProxyTransfer, Hash, Log, LogFilter, PaymentDetectionError, CONVERSION_EVENT_SIGNATURE,
    FEE_PROXY_EVENT_SIGNATURE,
};
use crate::ports::LedgerProvider;

#[derive(Default)]
pub struct MockLedger {
    logs: RwLock<Vec<Log>>,
    timestamps: RwLock<HashMap<BlockNumber, Timestamp>>,
    failures: AtomicU32,
    log_queries: AtomicU32,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_log(&self, log: Log) {
        self.logs.write().push(log);
    }

    pub fn set_block_timestamp(&self, block: BlockNumber, timestamp: Timestamp) {
        self.timestamps.write().insert(block, timestamp);
    }

    /// Make the next `n` calls fail.
    pub fn fail_next(&self, n: u32) {
        self.failures.store(n, Ordering::SeqCst);
    }

    /// Number of `get_logs` calls served so far.
    pub fn log_queries(&self) -> u32 {
        self.log_queries.load(Ordering::SeqCst)
    }

    /// Record one payment through the conversion proxy at `proxy`: a
    /// conversion log and the matching fee-proxy log in transaction
    /// `tx_hash`.
    pub fn push_conversion_payment(
        &self,
        proxy: Address,
        payment_reference: &str,
        block: BlockNumber,
        tx_hash: Hash,
        conversion: ConversionTransfer,
        transfer: FeeProxyTransfer,
    ) -> Result<(), PaymentDetectionError> {
        let reference = payment_reference_topic(payment_reference)?;
        self.push_log(Log {
            address: proxy,
            topics: vec![event_topic(CONVERSION_EVENT_SIGNATURE), reference],
            data: conversion.encode(),
            block_number: block,
            transaction_hash: tx_hash,
        });
        self.push_log(Log {
            address: proxy,
            topics: vec![event_topic(FEE_PROXY_EVENT_SIGNATURE), reference],
            data: transfer.encode(),
            block_number: block,
            transaction_hash: tx_hash,
        });
        Ok(())
    }

    fn check_failure(&self) -> Result<(), PaymentDetectionError> {
        let injected = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            Err(PaymentDetectionError::Ledger("injected failure".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LedgerProvider for MockLedger {
    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, PaymentDetectionError> {
        self.check_failure()?;
        self.log_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .logs
            .read()
            .iter()
            .filter(|log| filter.matches(log))
            .cloned()
            .collect())
    }

    async fn get_block_timestamp(
        &self,
        number: BlockNumber,
    ) -> Result<Timestamp, PaymentDetectionError> {
        self.check_failure()?;
        self.timestamps
            .read()
            .get(&number)
            .copied()
            .ok_or_else(|| PaymentDetectionError::Ledger(format!("unknown block {}", number)))
    }
}

/// Deterministic transaction hash for tests and fixtures.
pub fn tx_hash(seed: u64) -> Hash {
    Hash::from(keccak256(&seed.to_be_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BlockTag;
    use primitive_types::U256;

    #[tokio::test]
    async fn test_get_logs_filters() {
        let ledger = MockLedger::new();
        let proxy = Address::repeat_byte(0xcc);
        ledger
            .push_conversion_payment(
                proxy,
                "aabbccddeeff0011",
                5,
                tx_hash(1),
                ConversionTransfer {
                    amount: U256::from(100u64),
                    currency: Address::zero(),
                    fee_amount: U256::zero(),
                    max_rate_timespan: U256::zero(),
                },
                FeeProxyTransfer {
                    to: Address::repeat_byte(1),
                    amount: U256::from(1u64),
                    fee_amount: U256::zero(),
                    fee_address: Address::zero(),
                },
            )
            .unwrap();

        let filter = LogFilter {
            address: proxy,
            topics: vec![Some(event_topic(FEE_PROXY_EVENT_SIGNATURE))],
            from_block: 0,
            to_block: BlockTag::Latest,
        };
        let logs = ledger.get_logs(&filter).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(FeeProxyTransfer::decode(&logs[0].data).unwrap().amount, U256::one());
        assert_eq!(ledger.log_queries(), 1);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let ledger = MockLedger::new();
        ledger.set_block_timestamp(3, 1_000);
        ledger.fail_next(1);
        assert!(ledger.get_block_timestamp(3).await.is_err());
        assert_eq!(ledger.get_block_timestamp(3).await.unwrap(), 1_000);
        assert!(ledger.get_block_timestamp(4).await.is_err());
    }
}
