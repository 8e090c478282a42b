//! # Domain Layer
//!
//! Pure domain logic for the Data Access subsystem.
//!
//! ## Modules
//!
//! - `block` - Block, BlockHeader, Transaction
//! - `value_objects` - Time boundaries, storage meta, API result shapes
//! - `errors` - Domain error types

pub mod block;
pub mod errors;
pub mod value_objects;

pub use block::{Block, BlockHeader, Transaction, BLOCK_VERSION};
pub use errors::{BlockParseError, DataAccessError, KVStoreError, StorageError};
pub use value_objects::{
    within, ChannelsWithMeta, ConfirmedTransaction, PersistedTransaction, StorageMeta,
    SyncReport, TimestampBoundaries, TransactionsWithMeta,
};
