//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the Data Access service.
//!
//! - [`Storage`] - the content-addressed storage backend (e.g. a
//!   blockchain-anchored store). Source of truth.
//! - [`TransactionIndexApi`] - the channel/topic lookup structure. A derived,
//!   rebuildable cache over storage.
//! - [`KeyValueStore`] - persistence behind the default transaction index.
//! - [`TimeSource`] - wall clock, injectable for tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::Timestamp;

use crate::domain::{
    BlockHeader, DataAccessError, KVStoreError, StorageError, StorageMeta, TimestampBoundaries,
};

/// Result of appending a blob to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendResult {
    /// Location of the stored blob (e.g. its content hash).
    pub data_id: String,
    pub meta: StorageMeta,
}

/// Result of reading one blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadResult {
    pub content: String,
    pub meta: StorageMeta,
}

/// Result of a ranged `get_data` call.
///
/// `data`, `data_ids` and `meta.meta_data` are index-aligned. The two
/// result lists are optional because a misbehaving backend may omit them;
/// the consumer treats that as a contract violation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageData {
    #[serde(default)]
    pub data: Option<Vec<String>>,
    #[serde(default)]
    pub data_ids: Option<Vec<String>>,
    pub meta: StorageDataMeta,
}

/// Metadata of a ranged `get_data` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageDataMeta {
    /// Latest storage timestamp fully covered by this answer. The
    /// synchronization watermark advances to exactly this value.
    pub last_timestamp: Timestamp,
    pub meta_data: Vec<StorageMeta>,
}

/// Content-addressed storage backend.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Prepare the backend. Called once by `DataAccess::initialize`.
    async fn initialize(&self) -> Result<(), StorageError>;

    /// Append a serialized block.
    async fn append(&self, content: String) -> Result<AppendResult, StorageError>;

    /// Read the blob stored at `location`.
    async fn read(&self, location: &str) -> Result<ReadResult, StorageError>;

    /// All blobs stored within `boundaries` (everything when `None`).
    async fn get_data(
        &self,
        boundaries: Option<TimestampBoundaries>,
    ) -> Result<StorageData, StorageError>;
}

/// Channel/topic index over storage locations.
///
/// ## Atomicity
///
/// `add_transaction` is atomic with respect to one block header: concurrent
/// readers observe either none or all of its entries.
#[async_trait]
pub trait TransactionIndexApi: Send + Sync {
    /// Prepare the index. Fails with `AlreadyInitialized` on a second call.
    async fn initialize(&self) -> Result<(), DataAccessError>;

    /// Record `location` for every channel of `header`, and every topic of
    /// `header` against its channel, at `timestamp`. Re-adding the same data
    /// leaves query results unchanged.
    async fn add_transaction(
        &self,
        location: &str,
        header: &BlockHeader,
        timestamp: Timestamp,
    ) -> Result<(), DataAccessError>;

    /// Locations holding transactions of `channel_id`, in indexing order,
    /// restricted to `boundaries` when given.
    async fn get_storage_location_list(
        &self,
        channel_id: &str,
        boundaries: Option<TimestampBoundaries>,
    ) -> Result<Vec<String>, DataAccessError>;

    /// Channels tagged with `topic` whose latest update to that topic falls
    /// within `updated_between`.
    async fn get_channel_ids_for_topic(
        &self,
        topic: &str,
        updated_between: Option<TimestampBoundaries>,
    ) -> Result<Vec<String>, DataAccessError>;

    /// Union of [`Self::get_channel_ids_for_topic`] over `topics`.
    async fn get_channel_ids_for_multiple_topics(
        &self,
        topics: &[String],
        updated_between: Option<TimestampBoundaries>,
    ) -> Result<Vec<String>, DataAccessError>;

    /// Latest timestamp indexed so far, `None` when the index is empty.
    async fn get_last_transaction_timestamp(&self) -> Result<Option<Timestamp>, DataAccessError>;
}

/// Abstract interface for key-value database operations.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL puts in the batch are applied, or NONE are.
    fn atomic_batch_write(&mut self, batch: WriteBatch) -> Result<(), KVStoreError>;
}

/// Ordered set of puts applied atomically.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    puts: Vec<(Vec<u8>, Vec<u8>)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.puts.push((key.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.puts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puts.is_empty()
    }
}

impl IntoIterator for WriteBatch {
    type Item = (Vec<u8>, Vec<u8>);
    type IntoIter = std::vec::IntoIter<(Vec<u8>, Vec<u8>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.puts.into_iter()
    }
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Get current timestamp in seconds since epoch.
    fn now(&self) -> Timestamp;
}
