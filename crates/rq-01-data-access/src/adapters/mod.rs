//! # Adapters Module
//!
//! Concrete implementations of the outbound ports.
//!
//! ## Modules
//!
//! - `storage`: in-memory key-value store and in-memory storage backend
//! - `index`: key-value backed transaction index
//! - `infra`: time sources

pub mod index;
pub mod infra;
pub mod storage;

pub use index::TransactionIndex;
pub use infra::{FixedTimeSource, SystemTimeSource};
pub use storage::{InMemoryKVStore, InMemoryStorage};
