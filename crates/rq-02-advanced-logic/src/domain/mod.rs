//! # Domain Layer
//!
//! - `action` - ExtensionAction, ActionKind, payment-network parameters
//! - `request` - Request, ExtensionState, ExtensionsState
//! - `errors` - ExtensionError

pub mod action;
pub mod errors;
pub mod request;

pub use action::{
    ActionKind, ActionParameters, ExtensionAction, PaymentNetworkValues,
    PAYMENT_NETWORK_ANY_ERC20_CONVERSION_FEE_PROXY_CONTRACT,
    PAYMENT_NETWORK_ERC20_FEE_PROXY_CONTRACT,
};
pub use errors::{AddressField, ExtensionError, Party};
pub use request::{ExtensionEvent, ExtensionState, ExtensionType, ExtensionsState, Request};
