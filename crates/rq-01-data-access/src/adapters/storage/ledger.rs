//! In-memory storage backend.
//!
//! Content addressed: the location of a blob is the multi-format keccak-256
//! hash of its content, so appending the same content twice yields the same
//! location and stores it once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{keccak256_multiformat, Timestamp};

use crate::adapters::infra::SystemTimeSource;
use crate::domain::{within, StorageError, StorageMeta, TimestampBoundaries};
use crate::ports::outbound::{
    AppendResult, ReadResult, Storage, StorageData, StorageDataMeta, TimeSource,
};

#[derive(Debug, Clone)]
struct StoredBlob {
    location: String,
    content: String,
    meta: StorageMeta,
}

#[derive(Debug, Default)]
struct LedgerState {
    /// Append order.
    blobs: Vec<StoredBlob>,
    /// Location → index into `blobs`.
    by_location: HashMap<String, usize>,
}

/// Storage backend kept in process memory.
pub struct InMemoryStorage {
    state: RwLock<LedgerState>,
    time_source: Arc<dyn TimeSource>,
    failing_get_data: AtomicUsize,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::with_time_source(Arc::new(SystemTimeSource))
    }

    /// Storage stamping blobs with `time_source`.
    pub fn with_time_source(time_source: Arc<dyn TimeSource>) -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
            time_source,
            failing_get_data: AtomicUsize::new(0),
        }
    }

    /// Make the next `count` calls to `get_data` fail with `Unavailable`.
    pub fn fail_next_get_data(&self, count: usize) {
        self.failing_get_data.store(count, Ordering::SeqCst);
    }

    /// Store `content` with an explicit timestamp.
    pub fn append_at(&self, content: String, timestamp: Timestamp) -> AppendResult {
        let location = keccak256_multiformat(content.as_bytes());
        let mut state = self.state.write();

        if let Some(&index) = state.by_location.get(&location) {
            return AppendResult {
                data_id: location,
                meta: state.blobs[index].meta.clone(),
            };
        }

        let meta = StorageMeta::at(timestamp);
        let index = state.blobs.len();
        state.blobs.push(StoredBlob {
            location: location.clone(),
            content,
            meta: meta.clone(),
        });
        state.by_location.insert(location.clone(), index);

        AppendResult {
            data_id: location,
            meta,
        }
    }

    pub fn len(&self) -> usize {
        self.state.read().blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().blobs.is_empty()
    }

    fn take_injected_failure(&self) -> bool {
        self.failing_get_data
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn initialize(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn append(&self, content: String) -> Result<AppendResult, StorageError> {
        Ok(self.append_at(content, self.time_source.now()))
    }

    async fn read(&self, location: &str) -> Result<ReadResult, StorageError> {
        let state = self.state.read();
        let index = state
            .by_location
            .get(location)
            .ok_or_else(|| StorageError::NotFound {
                location: location.to_string(),
            })?;
        let blob = &state.blobs[*index];
        Ok(ReadResult {
            content: blob.content.clone(),
            meta: blob.meta.clone(),
        })
    }

    async fn get_data(
        &self,
        boundaries: Option<TimestampBoundaries>,
    ) -> Result<StorageData, StorageError> {
        if self.take_injected_failure() {
            return Err(StorageError::Unavailable(
                "injected get_data failure".to_string(),
            ));
        }

        // Everything up to `to` (or now) is known, so that is the coverage
        // reported back to the caller.
        let last_timestamp = boundaries
            .and_then(|b| b.to)
            .unwrap_or_else(|| self.time_source.now());

        let state = self.state.read();
        let selected: Vec<&StoredBlob> = state
            .blobs
            .iter()
            .filter(|blob| within(boundaries.as_ref(), blob.meta.timestamp))
            .collect();

        Ok(StorageData {
            data: Some(selected.iter().map(|b| b.content.clone()).collect()),
            data_ids: Some(selected.iter().map(|b| b.location.clone()).collect()),
            meta: StorageDataMeta {
                last_timestamp,
                meta_data: selected.iter().map(|b| b.meta.clone()).collect(),
            },
        })
    }
}
