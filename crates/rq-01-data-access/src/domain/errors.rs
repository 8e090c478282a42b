//! # Domain Errors
//!
//! Error types for the Data Access subsystem.
//!
//! ## Taxonomy
//!
//! | Kind | Variants | Handling |
//! |------|----------|----------|
//! | Lifecycle | `NotInitialized`, `AlreadyInitialized` | fatal to the call |
//! | Validation | `InvalidTopics` | rejected before any write |
//! | Backend contract | `MalformedStorageResponse` | fatal, never retried |
//! | Transient data | `BlockParseError` during sync | counted and skipped |
//! | Collaborator | `Storage`, `IndexStore` | propagated |

use thiserror::Error;

/// Errors surfaced by the Data Access API.
#[derive(Debug, Error)]
pub enum DataAccessError {
    /// Operation called before `initialize()` completed.
    #[error("DataAccess must be initialized")]
    NotInitialized,

    /// `initialize()` called a second time.
    #[error("already initialized")]
    AlreadyInitialized,

    /// One or more topics are not multi-format keccak-256 hashes.
    #[error("The following topics are not well formatted: {0:?}")]
    InvalidTopics(Vec<String>),

    /// The storage backend answered `getData` without the expected shape.
    #[error("data from storage do not follow the standard: {0}")]
    MalformedStorageResponse(String),

    /// A block read back from a known location could not be parsed.
    #[error(transparent)]
    Block(#[from] BlockParseError),

    /// A block could not be serialized for storage.
    #[error("Block serialization error: {0}")]
    Serialization(String),

    /// The storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The key-value store behind the transaction index failed.
    #[error(transparent)]
    IndexStore(#[from] KVStoreError),

    /// An index record could not be decoded.
    #[error("Index record corrupted under key {key}: {message}")]
    IndexCorrupted { key: String, message: String },
}

/// A serialized block is not well formed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockParseError {
    /// Not JSON, or JSON without the block structure (missing header, ...).
    #[error("Invalid block structure: {0}")]
    InvalidStructure(String),

    #[error("Unsupported block version: {0}")]
    UnsupportedVersion(String),

    /// A channel claims a position past the end of the transaction list.
    #[error("Channel {channel_id} references transaction {position} but the block has {count} transactions")]
    PositionOutOfRange {
        channel_id: String,
        position: usize,
        count: usize,
    },

    /// Two channels claim the same transaction.
    #[error("Transaction {position} is claimed by more than one channel")]
    DuplicatePosition { position: usize },

    /// A channel id in the header is not a multi-format keccak-256 hash.
    #[error("Channel id {0} is not a valid hash")]
    InvalidChannelId(String),

    /// A topic in the header is not a multi-format keccak-256 hash.
    #[error("Topic {topic} of channel {channel_id} is not a valid hash")]
    InvalidTopic { channel_id: String, topic: String },

    /// A transaction has no header entry.
    #[error("Transaction {position} is not described by the header")]
    UndescribedTransaction { position: usize },

    /// Topics are listed for a channel with no transaction in the block.
    #[error("Topics given for channel {0} which has no transaction in the block")]
    TopicsForUnknownChannel(String),
}

/// Errors reported by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Nothing is stored at this location.
    #[error("No data stored at location {location}")]
    NotFound { location: String },

    /// The backend could not be reached or refused the request.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The backend has not been initialized.
    #[error("Storage not initialized")]
    NotInitialized,
}

/// Key-value store errors.
#[derive(Debug, Clone, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },
}
