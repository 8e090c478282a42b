//! # Advanced Logic Subsystem (rq-02)
//!
//! Extension state machines attached to requests. Every action found in a
//! request transaction that targets an extension goes through
//! [`ExtensionRegistry::apply_action_to_extensions`], a pure reducer that
//! returns the next extensions state or an error and never partially
//! applies an action.
//!
//! ## Payment Networks
//!
//! | Id | Request currency | Paid in |
//! |----|------------------|---------|
//! | `pn-any-erc20-conversion-fee-proxy-contract` | ISO4217 / ETH / ERC20 per network | any `tokensAccepted` token |
//! | `pn-erc20-fee-proxy-contract` | ERC20 | the request token |
//!
//! Both share the fee-reference action set: `create`, `addPaymentAddress`
//! (payee), `addRefundAddress` (payer) and `addFee` (payee). Each module
//! also exposes builders that validate inputs before an action is signed.
//!
//! ## Architecture
//!
//! - `domain/` - actions, request and extension state, errors
//! - `ports/` - reducer API, action handler and creation-rule traits
//! - `extensions/` - payment networks
//! - `service/` - the registry

pub mod domain;
pub mod extensions;
pub mod ports;
pub mod service;

#[cfg(test)]
mod test_data;

pub use domain::*;
pub use extensions::{conversion_fee_proxy, erc20_fee_proxy};
pub use ports::{ActionContext, ActionHandler, AdvancedLogicApi, CreationRules};
pub use service::ExtensionRegistry;
