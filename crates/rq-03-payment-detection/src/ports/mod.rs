//! # Ports Module

pub mod inbound;
pub mod outbound;

pub use inbound::PaymentNetworkApi;
pub use outbound::{BalanceSource, LedgerProvider};
