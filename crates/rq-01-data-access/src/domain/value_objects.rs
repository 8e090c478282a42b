//! # Value Objects
//!
//! Time boundaries, storage metadata and the result shapes returned by the
//! Data Access API. Every result carries the data plus a parallel metadata
//! structure (storage locations, storage-layer meta) so callers can audit
//! provenance.

use serde::{Deserialize, Serialize};
use shared_types::Timestamp;
use std::collections::BTreeMap;

use super::block::Transaction;

/// Inclusive time window. A missing `from` means "since the beginning",
/// a missing `to` means "until now".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampBoundaries {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Timestamp>,
}

impl TimestampBoundaries {
    pub fn between(from: Timestamp, to: Timestamp) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn since(from: Timestamp) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }

    pub fn until(to: Timestamp) -> Self {
        Self {
            from: None,
            to: Some(to),
        }
    }

    /// Fill a missing `to` with `now`.
    pub fn closed_at(self, now: Timestamp) -> Self {
        Self {
            from: self.from,
            to: self.to.or(Some(now)),
        }
    }

    /// True if `timestamp` lies in `[from, to]`. An unresolved `to` is
    /// open-ended, see [`TimestampBoundaries::closed_at`].
    pub fn contains(&self, timestamp: Timestamp) -> bool {
        timestamp >= self.from.unwrap_or(0) && timestamp <= self.to.unwrap_or(Timestamp::MAX)
    }
}

/// Returns true when `boundaries` is absent or contains `timestamp`.
pub fn within(boundaries: Option<&TimestampBoundaries>, timestamp: Timestamp) -> bool {
    boundaries.map_or(true, |b| b.contains(timestamp))
}

/// Metadata attached by the storage layer to a stored blob.
///
/// Only `timestamp` is interpreted here; any other backend field is carried
/// through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageMeta {
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StorageMeta {
    pub fn at(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            extra: serde_json::Map::new(),
        }
    }
}

/// A transaction together with the timestamp of the block that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedTransaction {
    pub timestamp: Timestamp,
    pub transaction: Transaction,
}

/// Result of `persist_transaction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedTransaction {
    pub transaction_storage_location: String,
    pub storage_meta: StorageMeta,
    pub topics: Vec<String>,
}

/// Transactions of one channel plus index-aligned provenance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsWithMeta {
    pub transactions: Vec<ConfirmedTransaction>,
    /// `transactions_storage_location[i]` holds `transactions[i]`.
    pub transactions_storage_location: Vec<String>,
    /// `storage_meta[i]` is the meta of the block holding `transactions[i]`.
    pub storage_meta: Vec<StorageMeta>,
}

impl TransactionsWithMeta {
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Transactions of several channels, keyed by channel id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsWithMeta {
    pub transactions: BTreeMap<String, Vec<ConfirmedTransaction>>,
    pub transactions_storage_location: BTreeMap<String, Vec<String>>,
    pub storage_meta: BTreeMap<String, Vec<StorageMeta>>,
}

impl ChannelsWithMeta {
    /// Record one channel's transactions.
    pub fn insert(&mut self, channel_id: String, channel: TransactionsWithMeta) {
        self.transactions_storage_location
            .insert(channel_id.clone(), channel.transactions_storage_location);
        self.storage_meta
            .insert(channel_id.clone(), channel.storage_meta);
        self.transactions.insert(channel_id, channel.transactions);
    }

    pub fn channel_ids(&self) -> impl Iterator<Item = &String> {
        self.transactions.keys()
    }
}

/// Outcome of indexing one batch of storage data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Blobs parsed and indexed.
    pub proceeded: usize,
    /// Blobs skipped because they are not valid blocks.
    pub parse_errors: usize,
}
