//! # Ports Module
//!
//! Hexagonal architecture ports (inbound API, outbound dependencies).

pub mod inbound;
pub mod outbound;

pub use inbound::DataAccessApi;
pub use outbound::{
    AppendResult, KeyValueStore, ReadResult, Storage, StorageData, StorageDataMeta, TimeSource,
    TransactionIndexApi, WriteBatch,
};
