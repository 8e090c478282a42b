//! # ERC20 Fee Proxy
//!
//! `pn-erc20-fee-proxy-contract`: the request is denominated in an ERC20
//! token and paid in that same token through the fee proxy.

use shared_types::CurrencyType;

use super::fee_reference::{
    add_fee_action, add_payment_address_action, add_refund_address_action,
    check_creation_parameters, register_fee_reference_handlers,
};
use crate::domain::{
    ActionKind, ActionParameters, ExtensionAction, ExtensionError, Request,
    PAYMENT_NETWORK_ERC20_FEE_PROXY_CONTRACT as EXTENSION_ID,
};
use crate::ports::CreationRules;
use crate::service::ExtensionRegistry;

pub const CURRENT_VERSION: &str = "0.1.0";

pub const SUPPORTED_NETWORKS: [&str; 3] = ["mainnet", "rinkeby", "private"];

/// ERC20 request currency on a supported network.
///
/// The network is taken from the parameters, then from the request
/// currency, and defaults to mainnet.
#[derive(Debug, Default, Clone, Copy)]
pub struct Erc20Rules;

impl CreationRules for Erc20Rules {
    fn validate(
        &self,
        parameters: &ActionParameters,
        request: &Request,
    ) -> Result<(), ExtensionError> {
        let network = parameters
            .network
            .as_deref()
            .or(request.currency.network.as_deref())
            .unwrap_or("mainnet");
        if !SUPPORTED_NETWORKS.contains(&network) {
            return Err(ExtensionError::UnsupportedNetwork(network.to_string()));
        }
        if request.currency.currency_type != CurrencyType::Erc20 {
            return Err(ExtensionError::UnsupportedCurrencyType(
                request.currency.currency_type,
            ));
        }
        Ok(())
    }
}

pub fn register(registry: &mut ExtensionRegistry) {
    register_fee_reference_handlers(registry, EXTENSION_ID, CURRENT_VERSION, Erc20Rules);
}

pub fn create_creation_action(
    parameters: ActionParameters,
) -> Result<ExtensionAction, ExtensionError> {
    check_creation_parameters(&parameters)?;
    Ok(
        ExtensionAction::new(ActionKind::Create, EXTENSION_ID, parameters)
            .with_version(CURRENT_VERSION),
    )
}

pub fn create_add_payment_address_action(
    payment_address: &str,
) -> Result<ExtensionAction, ExtensionError> {
    add_payment_address_action(EXTENSION_ID, payment_address)
}

pub fn create_add_refund_address_action(
    refund_address: &str,
) -> Result<ExtensionAction, ExtensionError> {
    add_refund_address_action(EXTENSION_ID, refund_address)
}

pub fn create_add_fee_action(
    fee_address: &str,
    fee_amount: &str,
) -> Result<ExtensionAction, ExtensionError> {
    add_fee_action(EXTENSION_ID, fee_address, fee_amount)
}
