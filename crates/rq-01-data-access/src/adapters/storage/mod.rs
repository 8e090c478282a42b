//! Storage Adapters
//!
//! In-memory implementations of `KeyValueStore` and `Storage`.

mod ledger;
mod memory;

pub use ledger::InMemoryStorage;
pub use memory::InMemoryKVStore;
