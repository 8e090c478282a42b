//! # Domain Errors
//!
//! Every failure leaves the input extensions state untouched.
//!
//! | Kind | Variants |
//! |------|----------|
//! | Dispatch | `UnknownExtension`, `UnknownAction` |
//! | Validation | `InvalidAddress`, `InvalidEthereumAddress`, `InvalidAmount`, `MissingTokensAccepted`, `InvalidTokenList`, `UnsupportedNetwork`, `UnsupportedCurrencyType`, `UnsupportedCurrency` |
//! | Sequencing | `AlreadyCreated`, `Uncreated`, `MissingParty`, `WrongSigner`, `FieldAlreadySet` |

use shared_types::CurrencyType;
use std::fmt;
use thiserror::Error;

/// Party of a request an action must come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Payee,
    Payer,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Payee => f.write_str("payee"),
            Party::Payer => f.write_str("payer"),
        }
    }
}

/// Write-once field of a fee-reference-based extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    Payment,
    Refund,
    Fee,
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressField::Payment => f.write_str("Payment address"),
            AddressField::Refund => f.write_str("Refund address"),
            AddressField::Fee => f.write_str("Fee address"),
        }
    }
}

/// Errors raised while building or applying extension actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionError {
    /// `create` received for an id that already has a state.
    #[error("This extension has already been created")]
    AlreadyCreated,

    /// Non-`create` action for an id without state.
    #[error("The extension should be created before receiving any other action")]
    Uncreated,

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// `create` received for an id no extension is registered under.
    #[error("Unknown extension: {0}")]
    UnknownExtension(String),

    #[error("The request must have a {0}")]
    MissingParty(Party),

    #[error("The signer must be the {0}")]
    WrongSigner(Party),

    #[error("{0} already given")]
    FieldAlreadySet(AddressField),

    /// Malformed address found while applying an action.
    #[error("{0} is not a valid address")]
    InvalidAddress(&'static str),

    /// Malformed address found while building an action.
    #[error("{0} is not a valid ethereum address")]
    InvalidEthereumAddress(&'static str),

    #[error("{0} is not a valid amount")]
    InvalidAmount(&'static str),

    #[error("tokensAccepted is required")]
    MissingTokensAccepted,

    #[error("tokensAccepted must contains only valid ethereum addresses")]
    InvalidTokenList,

    #[error("The network ({0}) is not supported for this payment network.")]
    UnsupportedNetwork(String),

    #[error("The currency type ({0}) of the request is not supported for this payment network.")]
    UnsupportedCurrencyType(CurrencyType),

    #[error("The currency ({0}) of the request is not supported for this payment network.")]
    UnsupportedCurrency(String),
}
