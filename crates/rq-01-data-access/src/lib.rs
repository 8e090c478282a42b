//! # Data Access Subsystem (rq-01)
//!
//! The Data Access subsystem persists request transactions into an
//! append-only, content-addressed storage backend and keeps a channel/topic
//! index over it so transactions can be retrieved by channel id or topic.
//!
//! ## Responsibilities
//!
//! - Wrap transactions into [`Block`]s and append them to [`Storage`]
//! - Index storage locations by channel id and topic ([`TransactionIndex`])
//! - Resolve channels and topics back into transactions with provenance
//! - Periodically pull new data from storage ([`IntervalTimer`])
//!
//! ## Data Flow
//!
//! ```text
//! persist_transaction ──→ Block ──append──→ Storage
//!                                              │ location
//!                                              ↓
//!                                      TransactionIndex
//!                                              ↑
//! synchronize_new_data_ids ──get_data(watermark..now)──┘
//!
//! get_transactions_by_channel_id ──→ TransactionIndex ──locations──→ Storage::read (fan-out)
//! ```
//!
//! ## Guarantees
//!
//! | Guarantee | Enforcement | Location |
//! |-----------|-------------|----------|
//! | Watermark only moves to storage-reported coverage | async mutex, set after success | service/mod.rs |
//! | One header indexed atomically | single write batch under write lock | adapters/index.rs |
//! | Corrupt blob never blocks sync | counted and skipped | service/mod.rs |
//! | Reads keep resolution order | `buffered` fan-out | service/mod.rs |
//! | At most one synchronization loop | guarded `start` | timer.rs |
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): blocks, boundaries, result shapes, errors
//! - **Ports Layer** (`ports/`): `DataAccessApi` inbound, storage/index/KV/time outbound
//! - **Adapters Layer** (`adapters/`): in-memory storage, KV-backed index, clocks
//! - **Service** (`service/`): the `DataAccess` orchestrator

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;
pub mod timer;

pub use adapters::{
    FixedTimeSource, InMemoryKVStore, InMemoryStorage, SystemTimeSource, TransactionIndex,
};
pub use config::DataAccessConfig;
pub use domain::{
    within, Block, BlockHeader, BlockParseError, ChannelsWithMeta, ConfirmedTransaction,
    DataAccessError, KVStoreError, PersistedTransaction, StorageError, StorageMeta, SyncReport,
    TimestampBoundaries, Transaction, TransactionsWithMeta, BLOCK_VERSION,
};
pub use ports::{
    AppendResult, DataAccessApi, KeyValueStore, ReadResult, Storage, StorageData,
    StorageDataMeta, TimeSource, TransactionIndexApi, WriteBatch,
};
pub use service::{DataAccess, DataAccessDependencies};
pub use timer::IntervalTimer;
