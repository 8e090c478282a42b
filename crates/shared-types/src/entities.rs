//! # Core Domain Entities
//!
//! Identities and currencies, as they appear inside requests and actions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::formats::{keccak256, same_address};

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// Kind of identity a party (payee, payer, signer) is expressed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityType {
    /// Externally owned Ethereum account.
    #[serde(rename = "ethereumAddress")]
    EthereumAddress,
    /// Ethereum smart contract.
    #[serde(rename = "ethereumSmartContract")]
    EthereumSmartContract,
}

/// A party of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "type")]
    pub identity_type: IdentityType,
    pub value: String,
}

impl Identity {
    /// Identity backed by an Ethereum address.
    pub fn ethereum_address(value: impl Into<String>) -> Self {
        Self {
            identity_type: IdentityType::EthereumAddress,
            value: value.into(),
        }
    }

    /// Two identities are the same party when their types match and their
    /// values match case-insensitively (addresses are not case sensitive).
    pub fn is_same_as(&self, other: &Identity) -> bool {
        self.identity_type == other.identity_type && same_address(&self.value, &other.value)
    }
}

/// Currency families a request can be denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CurrencyType {
    /// Fiat currency identified by its ISO 4217 code.
    #[serde(rename = "ISO4217")]
    Iso4217,
    /// Native ether.
    #[serde(rename = "ETH")]
    Eth,
    /// ERC20 token identified by its contract address.
    #[serde(rename = "ERC20")]
    Erc20,
    /// Bitcoin.
    #[serde(rename = "BTC")]
    Btc,
}

impl fmt::Display for CurrencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CurrencyType::Iso4217 => "ISO4217",
            CurrencyType::Eth => "ETH",
            CurrencyType::Erc20 => "ERC20",
            CurrencyType::Btc => "BTC",
        };
        f.write_str(s)
    }
}

/// Currency of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    #[serde(rename = "type")]
    pub currency_type: CurrencyType,
    /// ISO code, symbol, or token address depending on the type.
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

impl Currency {
    pub fn new(currency_type: CurrencyType, value: impl Into<String>) -> Self {
        Self {
            currency_type,
            value: value.into(),
            network: None,
        }
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// 20-byte identifier of the currency as used by on-chain price feeds.
    ///
    /// ERC20 tokens are identified by their (lowercased) contract address;
    /// everything else by the last 20 bytes of keccak256(symbol).
    pub fn hash(&self) -> String {
        match self.currency_type {
            CurrencyType::Erc20 => self.value.to_ascii_lowercase(),
            _ => {
                let digest = keccak256(self.value.to_ascii_uppercase().as_bytes());
                format!("0x{}", hex::encode(&digest[12..]))
            }
        }
    }
}
