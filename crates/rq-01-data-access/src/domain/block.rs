//! # Block
//!
//! The append-only storage unit. A block wraps one or more transactions and a
//! header describing, for each channel present in the block, which
//! transaction positions belong to it and which topics tag it.
//!
//! ## Wire Format
//!
//! ```text
//! {
//!   "header": {
//!     "channelIds": { "<channelId>": [0, 2] },
//!     "topics":     { "<channelId>": ["01ab..", ...] },
//!     "version":    "0.1.0"
//!   },
//!   "transactions": [ { "data": "..." }, ... ]
//! }
//! ```
//!
//! ## Invariants
//!
//! - Channel ids and topics are multi-format keccak-256 hashes.
//! - Every transaction position is claimed by exactly one channel. A channel
//!   may list one of its own positions more than once.
//! - Every claimed position is within the transaction list.
//! - Topics are only listed for channels present in the block.
//!
//! Blocks have value semantics: [`Block::push_transaction`] returns a new block
//! and leaves the receiver untouched.

use serde::{Deserialize, Serialize};
use shared_types::is_keccak256_multiformat;
use std::collections::{BTreeMap, HashMap};

use super::errors::BlockParseError;

/// Block format version written by this implementation.
pub const BLOCK_VERSION: &str = "0.1.0";

/// A single state-transition payload, opaque to this layer.
///
/// Clear transactions carry `data`; channel-encrypted ones carry
/// `encryptedData` plus the encryption method and per-party keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<BTreeMap<String, String>>,
}

impl Transaction {
    /// Transaction carrying clear data.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            ..Default::default()
        }
    }
}

/// Per-channel description of the transactions in a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    /// Channel id → positions of its transactions in the block.
    pub channel_ids: BTreeMap<String, Vec<usize>>,
    /// Channel id → topics tagging that channel's transactions.
    pub topics: BTreeMap<String, Vec<String>>,
    pub version: String,
}

impl Default for BlockHeader {
    fn default() -> Self {
        Self {
            channel_ids: BTreeMap::new(),
            topics: BTreeMap::new(),
            version: BLOCK_VERSION.to_string(),
        }
    }
}

/// An ordered list of transactions plus their header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// A block with no transactions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a copy of this block with `transaction` appended under
    /// `channel_id`, tagged with `topics`.
    pub fn push_transaction(
        &self,
        transaction: Transaction,
        channel_id: &str,
        topics: &[String],
    ) -> Block {
        let mut block = self.clone();
        let position = block.transactions.len();
        block.transactions.push(transaction);

        block
            .header
            .channel_ids
            .entry(channel_id.to_string())
            .or_default()
            .push(position);

        let channel_topics = block.header.topics.entry(channel_id.to_string()).or_default();
        for topic in topics {
            if !channel_topics.contains(topic) {
                channel_topics.push(topic.clone());
            }
        }

        block
    }

    /// Parse and validate a serialized block.
    pub fn parse(serialized: &str) -> Result<Block, BlockParseError> {
        let block: Block = serde_json::from_str(serialized)
            .map_err(|e| BlockParseError::InvalidStructure(e.to_string()))?;
        block.validate()?;
        Ok(block)
    }

    /// JSON form written to storage.
    pub fn serialize(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Positions of the transactions belonging to `channel_id`, in header order.
    pub fn transaction_positions(&self, channel_id: &str) -> Vec<usize> {
        self.header
            .channel_ids
            .get(channel_id)
            .cloned()
            .unwrap_or_default()
    }

    fn validate(&self) -> Result<(), BlockParseError> {
        if self.header.version != BLOCK_VERSION {
            return Err(BlockParseError::UnsupportedVersion(
                self.header.version.clone(),
            ));
        }

        if let Some(channel_id) = self
            .header
            .channel_ids
            .keys()
            .find(|id| !is_keccak256_multiformat(id))
        {
            return Err(BlockParseError::InvalidChannelId(channel_id.clone()));
        }
        for (channel_id, topics) in &self.header.topics {
            if let Some(topic) = topics.iter().find(|t| !is_keccak256_multiformat(t)) {
                return Err(BlockParseError::InvalidTopic {
                    channel_id: channel_id.clone(),
                    topic: topic.clone(),
                });
            }
        }

        let count = self.transactions.len();
        let mut claimed: HashMap<usize, &str> = HashMap::with_capacity(count);
        for (channel_id, positions) in &self.header.channel_ids {
            for &position in positions {
                if position >= count {
                    return Err(BlockParseError::PositionOutOfRange {
                        channel_id: channel_id.clone(),
                        position,
                        count,
                    });
                }
                match claimed.insert(position, channel_id) {
                    Some(owner) if owner != channel_id.as_str() => {
                        return Err(BlockParseError::DuplicatePosition { position });
                    }
                    _ => {}
                }
            }
        }

        if let Some(position) = (0..count).find(|p| !claimed.contains_key(p)) {
            return Err(BlockParseError::UndescribedTransaction { position });
        }

        if let Some(channel_id) = self
            .header
            .topics
            .keys()
            .find(|id| !self.header.channel_ids.contains_key(*id))
        {
            return Err(BlockParseError::TopicsForUnknownChannel(channel_id.clone()));
        }

        Ok(())
    }
}
