//! # Inbound Ports (Driving Ports)
//!
//! The primary API of the Data Access subsystem, consumed by the request
//! reducer.

use async_trait::async_trait;

use crate::domain::{
    ChannelsWithMeta, DataAccessError, PersistedTransaction, SyncReport, TimestampBoundaries,
    Transaction, TransactionsWithMeta,
};

/// Primary API for the Data Access subsystem.
///
/// ## Lifecycle
///
/// `Uninitialized → Initialized`. Every operation except `initialize` and
/// `stop_auto_synchronization` fails with `NotInitialized` until
/// `initialize` has succeeded; `initialize` fails with `AlreadyInitialized`
/// when called again.
#[async_trait]
pub trait DataAccessApi: Send + Sync {
    /// Initialize the index and the storage, then index everything storage
    /// holds since the index's last known timestamp.
    async fn initialize(&self) -> Result<(), DataAccessError>;

    /// Wrap `transaction` in a new block, append it to storage and index it.
    ///
    /// ## Errors
    ///
    /// - `InvalidTopics`: a topic is not a multi-format keccak-256 hash.
    ///   Nothing is written.
    async fn persist_transaction(
        &self,
        transaction: Transaction,
        channel_id: &str,
        topics: &[String],
    ) -> Result<PersistedTransaction, DataAccessError>;

    /// All transactions of a channel, restricted to blocks stored within
    /// `boundaries` when given, in resolution order.
    async fn get_transactions_by_channel_id(
        &self,
        channel_id: &str,
        boundaries: Option<TimestampBoundaries>,
    ) -> Result<TransactionsWithMeta, DataAccessError>;

    /// Transactions of every channel tagged with `topic`.
    async fn get_channels_by_topic(
        &self,
        topic: &str,
        updated_between: Option<TimestampBoundaries>,
    ) -> Result<ChannelsWithMeta, DataAccessError>;

    /// Transactions of every channel tagged with any of `topics`.
    async fn get_channels_by_multiple_topics(
        &self,
        topics: &[String],
        updated_between: Option<TimestampBoundaries>,
    ) -> Result<ChannelsWithMeta, DataAccessError>;

    /// Index everything storage holds since the watermark, then advance the
    /// watermark to the storage-reported last timestamp.
    async fn synchronize_new_data_ids(&self) -> Result<SyncReport, DataAccessError>;

    /// Run `synchronize_new_data_ids` periodically.
    fn start_auto_synchronization(&self) -> Result<(), DataAccessError>;

    /// Stop periodic synchronization. Always safe to call.
    fn stop_auto_synchronization(&self);
}
