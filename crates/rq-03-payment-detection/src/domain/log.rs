//! # Ledger Logs
//!
//! Raw event logs as returned by an Ethereum node, the filter used to query
//! them, and ABI decoding of the two proxy events.
//!
//! ## Proxy Events
//!
//! Both events index the payment reference (a `bytes` value, so the topic
//! is its keccak-256). The other arguments are 32-byte ABI words in `data`:
//!
//! | Event | Data words |
//! |-------|------------|
//! | `TransferWithConversionAndReference` | amount, currency, feeAmount, maxRateTimespan |
//! | `TransferWithReferenceAndFee` | to, amount, feeAmount, feeAddress |

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_types::{keccak256, to_checksum_address};

pub use primitive_types::{H160 as Address, H256 as Hash};

pub type BlockNumber = u64;

/// Signature of the event emitted by the conversion proxy.
pub const CONVERSION_EVENT_SIGNATURE: &str =
    "TransferWithConversionAndReference(uint256,address,bytes,uint256,uint256)";

/// Signature of the event emitted by the fee proxy the conversion proxy calls.
pub const FEE_PROXY_EVENT_SIGNATURE: &str =
    "TransferWithReferenceAndFee(address,uint256,bytes,uint256,address)";

const WORD: usize = 32;

/// Topic identifying an event by its signature.
pub fn event_topic(signature: &str) -> Hash {
    Hash::from(keccak256(signature.as_bytes()))
}

/// EIP-55 form of `address`.
pub fn address_to_string(address: &Address) -> String {
    let lower = format!("0x{}", hex::encode(address.as_bytes()));
    to_checksum_address(&lower).unwrap_or(lower)
}

/// Upper end of a block range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    Number(BlockNumber),
    Latest,
}

/// One event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    pub topics: Vec<Hash>,
    pub data: Vec<u8>,
    pub block_number: BlockNumber,
    pub transaction_hash: Hash,
}

/// Log query: contract address, positional topics (`None` matches any)
/// and block range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    pub address: Address,
    pub topics: Vec<Option<Hash>>,
    pub from_block: BlockNumber,
    pub to_block: BlockTag,
}

impl LogFilter {
    pub fn matches(&self, log: &Log) -> bool {
        if log.address != self.address || log.block_number < self.from_block {
            return false;
        }
        if let BlockTag::Number(to) = self.to_block {
            if log.block_number > to {
                return false;
            }
        }
        self.topics.iter().enumerate().all(|(i, topic)| match topic {
            Some(expected) => log.topics.get(i) == Some(expected),
            None => true,
        })
    }
}

// =============================================================================
// ABI WORDS
// =============================================================================

fn word(data: &[u8], index: usize) -> Option<&[u8]> {
    data.get(index * WORD..(index + 1) * WORD)
}

fn word_u256(data: &[u8], index: usize) -> Option<U256> {
    word(data, index).map(U256::from_big_endian)
}

fn word_address(data: &[u8], index: usize) -> Option<Address> {
    let w = word(data, index)?;
    // left-padded: the first 12 bytes must be zero
    if w[..12].iter().any(|b| *b != 0) {
        return None;
    }
    Some(Address::from_slice(&w[12..]))
}

fn encode_words(words: &[[u8; WORD]]) -> Vec<u8> {
    words.iter().flatten().copied().collect()
}

fn u256_word(value: U256) -> [u8; WORD] {
    let mut out = [0u8; WORD];
    value.to_big_endian(&mut out);
    out
}

fn address_word(value: Address) -> [u8; WORD] {
    let mut out = [0u8; WORD];
    out[12..].copy_from_slice(value.as_bytes());
    out
}

// =============================================================================
// PROXY EVENTS
// =============================================================================

/// Arguments of `TransferWithConversionAndReference`.
///
/// Amounts carry the 8 decimals of the price feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionTransfer {
    pub amount: U256,
    pub currency: Address,
    pub fee_amount: U256,
    pub max_rate_timespan: U256,
}

impl ConversionTransfer {
    pub const NAME: &'static str = "TransferWithConversionAndReference";

    pub fn decode(data: &[u8]) -> Option<Self> {
        Some(Self {
            amount: word_u256(data, 0)?,
            currency: word_address(data, 1)?,
            fee_amount: word_u256(data, 2)?,
            max_rate_timespan: word_u256(data, 3)?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        encode_words(&[
            u256_word(self.amount),
            address_word(self.currency),
            u256_word(self.fee_amount),
            u256_word(self.max_rate_timespan),
        ])
    }
}

/// Arguments of `TransferWithReferenceAndFee`. Amounts are token units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeProxyTransfer {
    pub to: Address,
    pub amount: U256,
    pub fee_amount: U256,
    pub fee_address: Address,
}

impl FeeProxyTransfer {
    pub const NAME: &'static str = "TransferWithReferenceAndFee";

    pub fn decode(data: &[u8]) -> Option<Self> {
        Some(Self {
            to: word_address(data, 0)?,
            amount: word_u256(data, 1)?,
            fee_amount: word_u256(data, 2)?,
            fee_address: word_address(data, 3)?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        encode_words(&[
            address_word(self.to),
            u256_word(self.amount),
            u256_word(self.fee_amount),
            address_word(self.fee_address),
        ])
    }
}
