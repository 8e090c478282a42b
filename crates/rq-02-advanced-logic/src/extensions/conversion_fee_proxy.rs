//! # Any-to-ERC20 Conversion Fee Proxy
//!
//! `pn-any-erc20-conversion-fee-proxy-contract`: the request is denominated
//! in any supported currency and paid in one of the `tokensAccepted` ERC20
//! tokens through the conversion proxy, which converts with on-chain price
//! feeds and forwards a fee.

use shared_types::{is_valid_eth_address, same_address, CurrencyType};

use super::fee_reference::{
    add_fee_action, add_payment_address_action, add_refund_address_action,
    check_creation_parameters, register_fee_reference_handlers,
};
use crate::domain::{
    ActionKind, ActionParameters, ExtensionAction, ExtensionError, Request,
    PAYMENT_NETWORK_ANY_ERC20_CONVERSION_FEE_PROXY_CONTRACT as EXTENSION_ID,
};
use crate::ports::CreationRules;
use crate::service::ExtensionRegistry;

/// Version stamped on new `create` actions.
pub const CURRENT_VERSION: &str = "0.1.0";

/// Network assumed when the creation parameters do not name one.
pub const DEFAULT_NETWORK: &str = "mainnet";

type CurrencyTable = &'static [(CurrencyType, &'static [&'static str])];

/// Request currencies accepted per network.
const SUPPORTED_CURRENCIES: &[(&str, CurrencyTable)] = &[
    (
        "mainnet",
        &[
            (CurrencyType::Iso4217, &["USD", "EUR"]),
            (CurrencyType::Eth, &["ETH"]),
            (
                CurrencyType::Erc20,
                &["0x6b175474e89094c44da98b954eedeac495271d0f"],
            ),
        ],
    ),
    (
        "rinkeby",
        &[
            (CurrencyType::Iso4217, &["EUR", "USD"]),
            (CurrencyType::Eth, &["ETH"]),
            (
                CurrencyType::Erc20,
                &["0xfab46e002bbf0b4509813474841e0716e6730136"],
            ),
        ],
    ),
    (
        "private",
        &[
            (CurrencyType::Iso4217, &["USD", "EUR"]),
            (CurrencyType::Eth, &["ETH"]),
            (
                CurrencyType::Erc20,
                &["0x38cf23c52bb4b13f051aec09580a2de845a7fa35"],
            ),
        ],
    ),
];

/// Networks the conversion proxy is deployed on.
pub fn supported_networks() -> impl Iterator<Item = &'static str> {
    SUPPORTED_CURRENCIES.iter().map(|(network, _)| *network)
}

/// Check that `tokensAccepted` is a non-empty list of addresses.
fn check_tokens_accepted(tokens: Option<&[String]>) -> Result<(), ExtensionError> {
    match tokens {
        None | Some([]) => Err(ExtensionError::MissingTokensAccepted),
        Some(tokens) if tokens.iter().all(|t| is_valid_eth_address(t)) => Ok(()),
        Some(_) => Err(ExtensionError::InvalidTokenList),
    }
}

/// Network, request currency and accepted tokens.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConversionRules;

impl CreationRules for ConversionRules {
    fn validate(
        &self,
        parameters: &ActionParameters,
        request: &Request,
    ) -> Result<(), ExtensionError> {
        let network = parameters.network.as_deref().unwrap_or(DEFAULT_NETWORK);
        let (_, table) = SUPPORTED_CURRENCIES
            .iter()
            .find(|(name, _)| *name == network)
            .ok_or_else(|| ExtensionError::UnsupportedNetwork(network.to_string()))?;

        let currency = &request.currency;
        let (_, values) = table
            .iter()
            .find(|(currency_type, _)| *currency_type == currency.currency_type)
            .ok_or(ExtensionError::UnsupportedCurrencyType(currency.currency_type))?;

        let supported = values.iter().any(|value| match currency.currency_type {
            CurrencyType::Erc20 => same_address(value, &currency.value),
            _ => *value == currency.value,
        });
        if !supported {
            return Err(ExtensionError::UnsupportedCurrency(currency.value.clone()));
        }

        check_tokens_accepted(parameters.tokens_accepted.as_deref())
    }
}

/// Register the handlers of this payment network.
pub fn register(registry: &mut ExtensionRegistry) {
    register_fee_reference_handlers(registry, EXTENSION_ID, CURRENT_VERSION, ConversionRules);
}

// =============================================================================
// ACTION BUILDERS
// =============================================================================

/// Build a `create` action.
pub fn create_creation_action(
    parameters: ActionParameters,
) -> Result<ExtensionAction, ExtensionError> {
    check_creation_parameters(&parameters)?;
    check_tokens_accepted(parameters.tokens_accepted.as_deref())?;
    Ok(
        ExtensionAction::new(ActionKind::Create, EXTENSION_ID, parameters)
            .with_version(CURRENT_VERSION),
    )
}

/// Build an `addPaymentAddress` action.
pub fn create_add_payment_address_action(
    payment_address: &str,
) -> Result<ExtensionAction, ExtensionError> {
    add_payment_address_action(EXTENSION_ID, payment_address)
}

/// Build an `addRefundAddress` action.
pub fn create_add_refund_address_action(
    refund_address: &str,
) -> Result<ExtensionAction, ExtensionError> {
    add_refund_address_action(EXTENSION_ID, refund_address)
}

/// Build an `addFee` action.
pub fn create_add_fee_action(
    fee_address: &str,
    fee_amount: &str,
) -> Result<ExtensionAction, ExtensionError> {
    add_fee_action(EXTENSION_ID, fee_address, fee_amount)
}
