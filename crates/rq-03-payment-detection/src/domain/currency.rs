//! # Request Currency Precision
//!
//! Price feeds quote amounts with 8 decimals; events are reported in the
//! smallest unit of the request currency.

use primitive_types::U256;
use shared_types::{Currency, CurrencyType};

use super::log::Address;

/// Decimals of price-feed amounts.
pub const PRICE_FEED_DECIMALS: u32 = 8;

/// A request currency with its precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyDefinition {
    pub currency: Currency,
    pub decimals: u32,
}

impl CurrencyDefinition {
    pub fn new(currency: Currency, decimals: u32) -> Self {
        Self { currency, decimals }
    }

    /// Definition with the usual precision of the currency family:
    /// 2 for fiat (0 for JPY), 18 for ether and tokens.
    pub fn with_default_decimals(currency: Currency) -> Self {
        let decimals = match currency.currency_type {
            CurrencyType::Iso4217 if currency.value == "JPY" => 0,
            CurrencyType::Iso4217 => 2,
            CurrencyType::Btc => 8,
            CurrencyType::Eth | CurrencyType::Erc20 => 18,
        };
        Self::new(currency, decimals)
    }

    /// Identifier of the currency in conversion logs.
    pub fn hash(&self) -> String {
        self.currency.hash()
    }

    /// Whether `address` is this currency's identifier in conversion logs.
    pub fn is_identified_by(&self, address: &Address) -> bool {
        self.hash()
            .eq_ignore_ascii_case(&format!("0x{}", hex::encode(address.as_bytes())))
    }

    /// Convert a price-feed amount to request currency units.
    ///
    /// Extra precision is truncated. Saturates instead of overflowing.
    pub fn unpad_from_price_feed(&self, amount: U256) -> U256 {
        if self.decimals >= PRICE_FEED_DECIMALS {
            amount.saturating_mul(U256::exp10((self.decimals - PRICE_FEED_DECIMALS) as usize))
        } else {
            amount / U256::exp10((PRICE_FEED_DECIMALS - self.decimals) as usize)
        }
    }
}
