//! # Payment Network Extensions
//!
//! - `fee_reference` - handlers and builders shared by fee-reference-based networks
//! - `conversion_fee_proxy` - `pn-any-erc20-conversion-fee-proxy-contract`
//! - `erc20_fee_proxy` - `pn-erc20-fee-proxy-contract`

pub mod conversion_fee_proxy;
pub mod erc20_fee_proxy;
pub mod fee_reference;

pub use fee_reference::{
    AddFeeHandler, AddPaymentAddressHandler, AddRefundAddressHandler, CreateHandler,
};
