//! # Payment Events and Balances

use serde::{Deserialize, Serialize};
use shared_types::Timestamp;
use std::fmt;

use super::errors::BalanceError;
use super::log::{BlockNumber, Hash};

/// Direction of a detected transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentEventName {
    /// Payer to payee, sent to the payment address.
    Payment,
    /// Payee to payer, sent to the refund address.
    Refund,
}

impl fmt::Display for PaymentEventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentEventName::Payment => f.write_str("payment"),
            PaymentEventName::Refund => f.write_str("refund"),
        }
    }
}

/// Ledger details of a payment event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEventParameters {
    pub block: BlockNumber,
    pub tx_hash: Hash,
    /// Destination the balance is computed for.
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_address: Option<String>,
    /// Fee in request currency units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_amount: Option<String>,
    /// Token units actually transferred to `to`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_in_crypto: Option<String>,
    /// Token units actually transferred to the fee address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_amount_in_crypto: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rate_timespan: Option<String>,
}

/// One detected transfer, with its amount in request currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub amount: String,
    pub name: PaymentEventName,
    pub parameters: PaymentEventParameters,
    pub timestamp: Timestamp,
}

/// Events of one direction with their summed amount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsWithBalance {
    pub balance: String,
    pub events: Vec<PaymentEvent>,
}

/// Outcome of a balance computation.
///
/// `balance` is `None` when the computation failed; `error` then says why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceWithEvents {
    pub balance: Option<String>,
    pub fee_balance: Option<String>,
    pub events: Vec<PaymentEvent>,
    pub error: Option<BalanceError>,
}

impl BalanceWithEvents {
    pub fn failed(error: BalanceError) -> Self {
        Self {
            balance: None,
            fee_balance: None,
            events: Vec::new(),
            error: Some(error),
        }
    }
}
