//! # Data Access Service
//!
//! Orchestrates initialization, persistence, retrieval and periodic
//! synchronization over an injected storage backend and transaction index.
//!
//! ## Synchronization Watermark
//!
//! `last_sync_storage_timestamp` is only ever set to the `last_timestamp`
//! reported by storage for a batch that was fully processed. A failed
//! synchronization leaves it untouched, so the next attempt re-reads the
//! same window. It lives behind an async mutex which also serializes
//! `initialize` and `synchronize_new_data_ids` against each other.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use shared_types::{is_keccak256_multiformat, Timestamp};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::adapters::{InMemoryKVStore, SystemTimeSource, TransactionIndex};
use crate::config::DataAccessConfig;
use crate::domain::{
    Block, ChannelsWithMeta, ConfirmedTransaction, DataAccessError, PersistedTransaction,
    SyncReport, TimestampBoundaries, Transaction, TransactionsWithMeta,
};
use crate::ports::inbound::DataAccessApi;
use crate::ports::outbound::{ReadResult, Storage, StorageData, TimeSource, TransactionIndexApi};
use crate::timer::IntervalTimer;


/// Dependencies for creating a [`DataAccess`] service.
pub struct DataAccessDependencies {
    pub storage: Arc<dyn Storage>,
    pub index: Arc<dyn TransactionIndexApi>,
    pub time_source: Arc<dyn TimeSource>,
}

impl DataAccessDependencies {
    /// `storage` with an in-memory transaction index and the system clock.
    pub fn with_storage(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            index: Arc::new(TransactionIndex::new(InMemoryKVStore::new())),
            time_source: Arc::new(SystemTimeSource),
        }
    }
}

/// State shared between the service and its synchronization timer.
struct DataAccessCore {
    storage: Arc<dyn Storage>,
    index: Arc<dyn TransactionIndexApi>,
    time_source: Arc<dyn TimeSource>,
    initialized: AtomicBool,
    last_sync_storage_timestamp: Mutex<Timestamp>,
    max_concurrent_reads: usize,
}

/// The Data Access service.
pub struct DataAccess {
    core: Arc<DataAccessCore>,
    timer: IntervalTimer,
    config: DataAccessConfig,
}

impl DataAccess {
    /// Create a service over `storage` with the default index and clock.
    pub fn new(storage: Arc<dyn Storage>, config: DataAccessConfig) -> Self {
        Self::with_dependencies(DataAccessDependencies::with_storage(storage), config)
    }

    /// Create a service with the given dependencies.
    pub fn with_dependencies(deps: DataAccessDependencies, config: DataAccessConfig) -> Self {
        let core = DataAccessCore {
            storage: deps.storage,
            index: deps.index,
            time_source: deps.time_source,
            initialized: AtomicBool::new(false),
            last_sync_storage_timestamp: Mutex::new(0),
            max_concurrent_reads: config.max_concurrent_reads.max(1),
        };
        let timer = IntervalTimer::new(config.synchronization_interval(), config.max_sync_retries);

        Self {
            core: Arc::new(core),
            timer,
            config,
        }
    }

    pub fn config(&self) -> &DataAccessConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.core.initialized.load(Ordering::SeqCst)
    }

    /// Storage timestamp up to which data has been indexed.
    pub async fn last_sync_storage_timestamp(&self) -> Timestamp {
        *self.core.last_sync_storage_timestamp.lock().await
    }

    pub fn is_auto_synchronizing(&self) -> bool {
        self.timer.is_running()
    }
}

impl DataAccessCore {
    /// Resolve a missing upper bound to the current time.
    fn resolve_boundaries(
        &self,
        boundaries: Option<TimestampBoundaries>,
    ) -> Option<TimestampBoundaries> {
        boundaries.map(|b| b.closed_at(self.time_source.now()))
    }

    fn ensure_initialized(&self) -> Result<(), DataAccessError> {
        if self.initialized.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DataAccessError::NotInitialized)
        }
    }

    async fn initialize(&self) -> Result<(), DataAccessError> {
        let mut watermark = self.last_sync_storage_timestamp.lock().await;
        if self.initialized.load(Ordering::SeqCst) {
            return Err(DataAccessError::AlreadyInitialized);
        }

        self.index.initialize().await?;
        self.storage.initialize().await?;

        let last_synced = self.index.get_last_transaction_timestamp().await?;
        let boundaries =
            last_synced.map(|from| TimestampBoundaries::between(from, self.time_source.now()));
        let data = self.storage.get_data(boundaries).await?;
        let last_timestamp = data.meta.last_timestamp;

        self.push_locations_with_topics(data).await?;

        *watermark = last_timestamp;
        self.initialized.store(true, Ordering::SeqCst);
        info!("[rq-01] Data access initialized, synchronized up to {}", last_timestamp);
        Ok(())
    }

    async fn synchronize_new_data_ids(&self) -> Result<SyncReport, DataAccessError> {
        self.ensure_initialized()?;
        let mut watermark = self.last_sync_storage_timestamp.lock().await;

        let boundaries = TimestampBoundaries::between(*watermark, self.time_source.now());
        let data = self.storage.get_data(Some(boundaries)).await?;
        let last_timestamp = data.meta.last_timestamp;

        let report = self.push_locations_with_topics(data).await?;
        *watermark = last_timestamp;
        Ok(report)
    }

    /// Index every parseable blob of a `get_data` answer.
    async fn push_locations_with_topics(
        &self,
        data: StorageData,
    ) -> Result<SyncReport, DataAccessError> {
        let (blobs, locations) = match (data.data, data.data_ids) {
            (Some(blobs), Some(locations)) => (blobs, locations),
            _ => {
                return Err(DataAccessError::MalformedStorageResponse(
                    "missing data or dataIds".to_string(),
                ))
            }
        };
        let metas = data.meta.meta_data;
        if blobs.len() != locations.len() || blobs.len() != metas.len() {
            return Err(DataAccessError::MalformedStorageResponse(format!(
                "{} data, {} dataIds and {} metaData",
                blobs.len(),
                locations.len(),
                metas.len()
            )));
        }

        let mut report = SyncReport::default();
        for ((blob, location), meta) in blobs.iter().zip(&locations).zip(&metas) {
            match Block::parse(blob) {
                Ok(block) => {
                    self.index
                        .add_transaction(location, &block.header, meta.timestamp)
                        .await?;
                    report.proceeded += 1;
                }
                Err(e) => {
                    report.parse_errors += 1;
                    debug!("[rq-01] Error: can't parse content of the dataId ({}): {}", location, e);
                }
            }
        }

        info!(
            "[rq-01] Synchronization: {} blocks synchronized, {} ignored from parsing error",
            report.proceeded, report.parse_errors
        );
        Ok(report)
    }

    /// Read `locations` concurrently and extract the transactions of
    /// `channel_id`, keeping the order of `locations`.
    async fn read_channel(
        &self,
        channel_id: &str,
        locations: Vec<String>,
    ) -> Result<TransactionsWithMeta, DataAccessError> {
        let storage = &self.storage;
        let reads: Vec<(String, ReadResult)> = stream::iter(locations)
            .map(|location| async move {
                let read = storage.read(&location).await?;
                Ok::<_, DataAccessError>((location, read))
            })
            .buffered(self.max_concurrent_reads)
            .try_collect()
            .await?;

        let mut result = TransactionsWithMeta::default();
        for (location, read) in reads {
            let block = Block::parse(&read.content)?;
            let positions: BTreeSet<usize> =
                block.transaction_positions(channel_id).into_iter().collect();
            for position in positions {
                if let Some(transaction) = block.transactions.get(position) {
                    result.transactions.push(ConfirmedTransaction {
                        timestamp: read.meta.timestamp,
                        transaction: transaction.clone(),
                    });
                    result.transactions_storage_location.push(location.clone());
                    result.storage_meta.push(read.meta.clone());
                }
            }
        }
        Ok(result)
    }

    async fn channels_with_meta(
        &self,
        channel_ids: Vec<String>,
    ) -> Result<ChannelsWithMeta, DataAccessError> {
        let per_channel: Vec<(String, TransactionsWithMeta)> = stream::iter(channel_ids)
            .map(|channel_id| async move {
                let locations = self.index.get_storage_location_list(&channel_id, None).await?;
                let transactions = self.read_channel(&channel_id, locations).await?;
                Ok::<_, DataAccessError>((channel_id, transactions))
            })
            .buffered(self.max_concurrent_reads)
            .try_collect()
            .await?;

        let mut result = ChannelsWithMeta::default();
        for (channel_id, transactions) in per_channel {
            result.insert(channel_id, transactions);
        }
        Ok(result)
    }
}

fn validate_topics(topics: &[String]) -> Result<(), DataAccessError> {
    let malformed: Vec<String> = topics
        .iter()
        .filter(|topic| !is_keccak256_multiformat(topic))
        .cloned()
        .collect();
    if malformed.is_empty() {
        Ok(())
    } else {
        Err(DataAccessError::InvalidTopics(malformed))
    }
}

#[async_trait]
impl DataAccessApi for DataAccess {
    async fn initialize(&self) -> Result<(), DataAccessError> {
        self.core.initialize().await
    }

    async fn persist_transaction(
        &self,
        transaction: Transaction,
        channel_id: &str,
        topics: &[String],
    ) -> Result<PersistedTransaction, DataAccessError> {
        self.core.ensure_initialized()?;
        validate_topics(topics)?;

        let block = Block::empty().push_transaction(transaction, channel_id, topics);
        let content = block
            .serialize()
            .map_err(|e| DataAccessError::Serialization(e.to_string()))?;

        let appended = self.core.storage.append(content).await?;
        self.core
            .index
            .add_transaction(&appended.data_id, &block.header, appended.meta.timestamp)
            .await?;

        debug!(
            "[rq-01] Persisted transaction of channel {} at {}",
            channel_id, appended.data_id
        );
        Ok(PersistedTransaction {
            transaction_storage_location: appended.data_id,
            storage_meta: appended.meta,
            topics: topics.to_vec(),
        })
    }

    async fn get_transactions_by_channel_id(
        &self,
        channel_id: &str,
        boundaries: Option<TimestampBoundaries>,
    ) -> Result<TransactionsWithMeta, DataAccessError> {
        self.core.ensure_initialized()?;
        let boundaries = self.core.resolve_boundaries(boundaries);
        let locations = self
            .core
            .index
            .get_storage_location_list(channel_id, boundaries)
            .await?;
        self.core.read_channel(channel_id, locations).await
    }

    async fn get_channels_by_topic(
        &self,
        topic: &str,
        updated_between: Option<TimestampBoundaries>,
    ) -> Result<ChannelsWithMeta, DataAccessError> {
        self.get_channels_by_multiple_topics(&[topic.to_string()], updated_between)
            .await
    }

    async fn get_channels_by_multiple_topics(
        &self,
        topics: &[String],
        updated_between: Option<TimestampBoundaries>,
    ) -> Result<ChannelsWithMeta, DataAccessError> {
        self.core.ensure_initialized()?;
        validate_topics(topics)?;

        let updated_between = self.core.resolve_boundaries(updated_between);
        let channel_ids = self
            .core
            .index
            .get_channel_ids_for_multiple_topics(topics, updated_between)
            .await?;
        self.core.channels_with_meta(channel_ids).await
    }

    async fn synchronize_new_data_ids(&self) -> Result<SyncReport, DataAccessError> {
        self.core.synchronize_new_data_ids().await
    }

    fn start_auto_synchronization(&self) -> Result<(), DataAccessError> {
        self.core.ensure_initialized()?;
        let core = self.core.clone();
        self.timer.start(move || {
            let core = core.clone();
            async move { core.synchronize_new_data_ids().await.map(|_| ()) }
        });
        Ok(())
    }

    fn stop_auto_synchronization(&self) {
        self.timer.stop();
    }
}
