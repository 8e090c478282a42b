//! # Domain Errors

use rq_02_advanced_logic::ExtensionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::log::Hash;

/// Errors raised while detecting payments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentDetectionError {
    /// The request has no state for the payment network.
    #[error("The request does not have the extension : {0}")]
    MissingExtension(String),

    /// No proxy deployment is configured for the network.
    #[error("The network ({0}) is not supported by the conversion proxy")]
    UnsupportedNetwork(String),

    /// A value needed to query the ledger is absent from the extension.
    #[error("The extension has no {0}")]
    MissingValue(&'static str),

    /// A conversion log has no fee-proxy log in the same transaction.
    #[error("proxy log not found in transaction {0:?}")]
    ProxyLogNotFound(Hash),

    /// A log's data does not decode as the expected event.
    #[error("malformed {event} log in transaction {tx_hash:?}")]
    MalformedLog { event: &'static str, tx_hash: Hash },

    /// The payment reference is not hex.
    #[error("invalid payment reference: {0}")]
    InvalidPaymentReference(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The ledger provider failed.
    #[error("ledger error: {0}")]
    Ledger(String),

    /// Building an action failed.
    #[error(transparent)]
    Extension(#[from] ExtensionError),
}

/// Category of a balance failure, reported alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BalanceErrorCode {
    Unknown,
    WrongExtension,
    NetworkNotSupported,
}

/// Failure reported by `get_balance` in place of a balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceError {
    pub code: BalanceErrorCode,
    pub message: String,
}

impl From<&PaymentDetectionError> for BalanceError {
    fn from(error: &PaymentDetectionError) -> Self {
        let code = match error {
            PaymentDetectionError::MissingExtension(_) => BalanceErrorCode::WrongExtension,
            PaymentDetectionError::UnsupportedNetwork(_) => BalanceErrorCode::NetworkNotSupported,
            _ => BalanceErrorCode::Unknown,
        };
        Self {
            code,
            message: error.to_string(),
        }
    }
}
