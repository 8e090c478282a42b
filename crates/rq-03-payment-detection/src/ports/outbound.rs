//! # Outbound Ports (Driven Ports)

use async_trait::async_trait;
use rq_02_advanced_logic::{ExtensionState, Request};
use shared_types::Timestamp;

use crate::domain::{
    BlockNumber, EventsWithBalance, Log, LogFilter, PaymentDetectionError, PaymentEventName,
};

/// Read access to an Ethereum-like ledger.
#[async_trait]
pub trait LedgerProvider: Send + Sync {
    /// Logs matching `filter`, in chain order.
    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, PaymentDetectionError>;

    /// Timestamp of block `number`.
    async fn get_block_timestamp(
        &self,
        number: BlockNumber,
    ) -> Result<Timestamp, PaymentDetectionError>;
}

/// Detection of the transfers of one direction of one request.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Events sent to `to_address` for `request`, with their summed amount.
    async fn extract_balance_and_events(
        &self,
        request: &Request,
        extension: &ExtensionState,
        salt: Option<&str>,
        to_address: &str,
        event_name: PaymentEventName,
    ) -> Result<EventsWithBalance, PaymentDetectionError>;
}
