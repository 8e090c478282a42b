use std::collections::HashMap;

use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{KeyValueStore, WriteBatch};

/// In-memory key-value store backing the transaction index.
///
/// Batches are applied under the caller's exclusive borrow, so readers
/// never see a partially applied batch.
#[derive(Debug, Default)]
pub struct InMemoryKVStore {
    data: HashMap<Vec<u8>, Vec<u8>>,
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn atomic_batch_write(&mut self, batch: WriteBatch) -> Result<(), KVStoreError> {
        for (key, value) in batch {
            self.data.insert(key, value);
        }
        Ok(())
    }
}
