//! # Transaction Index
//!
//! Key-value backed implementation of [`TransactionIndexApi`].
//!
//! ## Records
//!
//! | Key | Value (bincode) |
//! |-----|-----------------|
//! | `channel:{id}` | `Vec<String>`: locations in indexing order, unique |
//! | `location:{location}` | `u64`: storage timestamp of the block |
//! | `topic:{topic}` | `BTreeMap<String, u64>`: channel → latest update |
//! | `meta:last-timestamp` | `u64`: latest timestamp indexed |
//!
//! All records touched by one block header are written in a single atomic
//! batch while holding the write lock.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::Timestamp;

use crate::domain::{within, BlockHeader, DataAccessError, TimestampBoundaries};
use crate::ports::outbound::{KeyValueStore, TransactionIndexApi, WriteBatch};

const LAST_TIMESTAMP_KEY: &str = "meta:last-timestamp";

fn channel_key(channel_id: &str) -> String {
    format!("channel:{}", channel_id)
}

fn location_key(location: &str) -> String {
    format!("location:{}", location)
}

fn topic_key(topic: &str) -> String {
    format!("topic:{}", topic)
}

/// Channel/topic index stored in a [`KeyValueStore`].
pub struct TransactionIndex<K: KeyValueStore> {
    store: RwLock<K>,
    initialized: AtomicBool,
}

impl<K: KeyValueStore> TransactionIndex<K> {
    pub fn new(store: K) -> Self {
        Self {
            store: RwLock::new(store),
            initialized: AtomicBool::new(false),
        }
    }
}

fn load<K, T>(store: &K, key: &str) -> Result<Option<T>, DataAccessError>
where
    K: KeyValueStore,
    T: DeserializeOwned,
{
    match store.get(key.as_bytes())? {
        None => Ok(None),
        Some(bytes) => bincode::deserialize(&bytes).map(Some).map_err(|e| {
            DataAccessError::IndexCorrupted {
                key: key.to_string(),
                message: e.to_string(),
            }
        }),
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, DataAccessError> {
    bincode::serialize(value).map_err(|e| DataAccessError::Serialization(e.to_string()))
}

#[async_trait]
impl<K: KeyValueStore + 'static> TransactionIndexApi for TransactionIndex<K> {
    async fn initialize(&self) -> Result<(), DataAccessError> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Err(DataAccessError::AlreadyInitialized);
        }
        Ok(())
    }

    async fn add_transaction(
        &self,
        location: &str,
        header: &BlockHeader,
        timestamp: Timestamp,
    ) -> Result<(), DataAccessError> {
        let mut store = self.store.write();
        let mut batch = WriteBatch::new();

        let loc_key = location_key(location);
        let location_timestamp = match load::<K, Timestamp>(&*store, &loc_key)? {
            Some(existing) => existing,
            None => {
                batch.put(loc_key, encode(&timestamp)?);
                timestamp
            }
        };

        for channel_id in header.channel_ids.keys() {
            let key = channel_key(channel_id);
            let mut locations: Vec<String> = load(&*store, &key)?.unwrap_or_default();
            if !locations.iter().any(|l| l == location) {
                locations.push(location.to_string());
                batch.put(key, encode(&locations)?);
            }
        }

        // Several channels of one header may share a topic.
        let mut topic_updates: BTreeMap<&str, BTreeMap<String, Timestamp>> = BTreeMap::new();
        for (channel_id, topics) in &header.topics {
            for topic in topics {
                if !topic_updates.contains_key(topic.as_str()) {
                    let existing = load(&*store, &topic_key(topic))?.unwrap_or_default();
                    topic_updates.insert(topic.as_str(), existing);
                }
                if let Some(channels) = topic_updates.get_mut(topic.as_str()) {
                    let latest = channels.entry(channel_id.clone()).or_insert(location_timestamp);
                    *latest = (*latest).max(location_timestamp);
                }
            }
        }
        for (topic, channels) in &topic_updates {
            batch.put(topic_key(topic), encode(channels)?);
        }

        let last: Option<Timestamp> = load(&*store, LAST_TIMESTAMP_KEY)?;
        if last.map_or(true, |last| location_timestamp > last) {
            batch.put(LAST_TIMESTAMP_KEY, encode(&location_timestamp)?);
        }

        if !batch.is_empty() {
            store.atomic_batch_write(batch)?;
        }
        Ok(())
    }

    async fn get_storage_location_list(
        &self,
        channel_id: &str,
        boundaries: Option<TimestampBoundaries>,
    ) -> Result<Vec<String>, DataAccessError> {
        let store = self.store.read();
        let locations: Vec<String> = load(&*store, &channel_key(channel_id))?.unwrap_or_default();
        if boundaries.is_none() {
            return Ok(locations);
        }

        let mut selected = Vec::with_capacity(locations.len());
        for location in locations {
            let timestamp: Option<Timestamp> = load(&*store, &location_key(&location))?;
            if timestamp.map_or(false, |ts| within(boundaries.as_ref(), ts)) {
                selected.push(location);
            }
        }
        Ok(selected)
    }

    async fn get_channel_ids_for_topic(
        &self,
        topic: &str,
        updated_between: Option<TimestampBoundaries>,
    ) -> Result<Vec<String>, DataAccessError> {
        let store = self.store.read();
        let channels: BTreeMap<String, Timestamp> =
            load(&*store, &topic_key(topic))?.unwrap_or_default();
        Ok(channels
            .into_iter()
            .filter(|(_, ts)| within(updated_between.as_ref(), *ts))
            .map(|(channel_id, _)| channel_id)
            .collect())
    }

    async fn get_channel_ids_for_multiple_topics(
        &self,
        topics: &[String],
        updated_between: Option<TimestampBoundaries>,
    ) -> Result<Vec<String>, DataAccessError> {
        let mut union = BTreeSet::new();
        for topic in topics {
            union.extend(self.get_channel_ids_for_topic(topic, updated_between).await?);
        }
        Ok(union.into_iter().collect())
    }

    async fn get_last_transaction_timestamp(&self) -> Result<Option<Timestamp>, DataAccessError> {
        let store = self.store.read();
        load(&*store, LAST_TIMESTAMP_KEY)
    }
}
