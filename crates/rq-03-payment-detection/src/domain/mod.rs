//! # Domain Layer
//!
//! - `log` - ledger logs, filters, proxy event ABI
//! - `events` - payment events and balances
//! - `currency` - request currency precision
//! - `reference` - payment reference derivation
//! - `balance` - balance aggregation
//! - `errors` - PaymentDetectionError, BalanceError

pub mod balance;
pub mod currency;
pub mod errors;
pub mod events;
pub mod log;
pub mod reference;

pub use currency::{CurrencyDefinition, PRICE_FEED_DECIMALS};
pub use errors::{BalanceError, BalanceErrorCode, PaymentDetectionError};
pub use events::{
    BalanceWithEvents, EventsWithBalance, PaymentEvent, PaymentEventName, PaymentEventParameters,
};
pub use log::{
    address_to_string, event_topic, Address, BlockNumber, BlockTag, ConversionTransfer,
    FeeProxyTransfer, Hash, Log, LogFilter, CONVERSION_EVENT_SIGNATURE, FEE_PROXY_EVENT_SIGNATURE,
};
pub use reference::{payment_reference, payment_reference_topic, PAYMENT_REFERENCE_BYTES};
