//! # Fee-Reference-Based Payment Networks
//!
//! Handlers and action builders shared by every payment network detected
//! through a payment reference and a fee proxy contract.
//!
//! ## Check Order
//!
//! A handler validates the format of its parameters first, then its
//! sequencing preconditions (state exists, party present, signer, field
//! not yet set). Either way a failure leaves the state untouched.

use shared_types::{is_valid_amount, is_valid_eth_address};
use std::sync::Arc;

use crate::domain::{
    ActionKind, ActionParameters, AddressField, ExtensionAction, ExtensionError, ExtensionEvent,
    ExtensionState, ExtensionType, Party,
};
use crate::ports::{ActionContext, ActionHandler, CreationRules};
use crate::service::ExtensionRegistry;

// =============================================================================
// VALIDATION HELPERS
// =============================================================================

/// Address check used by handlers ("... is not a valid address").
pub(crate) fn check_address(value: Option<&str>, name: &'static str) -> Result<(), ExtensionError> {
    match value {
        Some(address) if is_valid_eth_address(address) => Ok(()),
        _ => Err(ExtensionError::InvalidAddress(name)),
    }
}

pub(crate) fn check_optional_address(
    value: Option<&str>,
    name: &'static str,
) -> Result<(), ExtensionError> {
    match value {
        None => Ok(()),
        some => check_address(some, name),
    }
}

pub(crate) fn check_optional_amount(
    value: Option<&str>,
    name: &'static str,
) -> Result<(), ExtensionError> {
    match value {
        Some(amount) if !is_valid_amount(amount) => Err(ExtensionError::InvalidAmount(name)),
        _ => Ok(()),
    }
}

/// Address check used by builders ("... is not a valid ethereum address").
pub(crate) fn check_builder_address(
    value: Option<&str>,
    name: &'static str,
) -> Result<(), ExtensionError> {
    match value {
        Some(address) if !is_valid_eth_address(address) => {
            Err(ExtensionError::InvalidEthereumAddress(name))
        }
        _ => Ok(()),
    }
}

fn require_state(current: Option<&ExtensionState>) -> Result<&ExtensionState, ExtensionError> {
    current.ok_or(ExtensionError::Uncreated)
}

fn require_signer(party: Party, ctx: &ActionContext<'_>) -> Result<(), ExtensionError> {
    let expected = match party {
        Party::Payee => ctx.request.payee.as_ref(),
        Party::Payer => ctx.request.payer.as_ref(),
    }
    .ok_or(ExtensionError::MissingParty(party))?;

    if expected.is_same_as(ctx.signer) {
        Ok(())
    } else {
        Err(ExtensionError::WrongSigner(party))
    }
}

/// Copy of `state` with `values` updated by `update` and one event logged.
fn with_event(
    state: &ExtensionState,
    ctx: &ActionContext<'_>,
    event_parameters: ActionParameters,
    update: impl FnOnce(&mut ActionParameters),
) -> ExtensionState {
    let mut next = state.clone();
    update(&mut next.values);
    next.events.push(ExtensionEvent {
        name: ctx.action.action.clone(),
        parameters: event_parameters,
        timestamp: ctx.timestamp,
    });
    next
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `create`: refused outright when the extension exists, then
/// network-specific rules, then address and fee formats.
pub struct CreateHandler<R: CreationRules> {
    version: &'static str,
    rules: R,
}

impl<R: CreationRules> CreateHandler<R> {
    pub fn new(version: &'static str, rules: R) -> Self {
        Self { version, rules }
    }
}

impl<R: CreationRules> ActionHandler for CreateHandler<R> {
    fn apply(
        &self,
        current: Option<&ExtensionState>,
        ctx: &ActionContext<'_>,
    ) -> Result<ExtensionState, ExtensionError> {
        if current.is_some() {
            return Err(ExtensionError::AlreadyCreated);
        }

        let params = ctx.parameters();
        self.rules.validate(params, ctx.request)?;
        check_optional_address(params.payment_address.as_deref(), "paymentAddress")?;
        check_optional_address(params.refund_address.as_deref(), "refundAddress")?;
        check_optional_address(params.fee_address.as_deref(), "feeAddress")?;
        check_optional_amount(params.fee_amount.as_deref(), "feeAmount")?;

        Ok(ExtensionState {
            id: ctx.action.id.clone(),
            extension_type: ExtensionType::PaymentNetwork,
            version: ctx
                .action
                .version
                .clone()
                .unwrap_or_else(|| self.version.to_string()),
            values: params.clone(),
            events: Vec::new(),
        })
    }
}

/// `addPaymentAddress`: payee only, once.
pub struct AddPaymentAddressHandler;

impl ActionHandler for AddPaymentAddressHandler {
    fn apply(
        &self,
        current: Option<&ExtensionState>,
        ctx: &ActionContext<'_>,
    ) -> Result<ExtensionState, ExtensionError> {
        let address = ctx.parameters().payment_address.as_deref();
        check_address(address, "paymentAddress")?;

        let state = require_state(current)?;
        require_signer(Party::Payee, ctx)?;
        if state.values.payment_address.is_some() {
            return Err(ExtensionError::FieldAlreadySet(AddressField::Payment));
        }

        let address = address.map(str::to_string);
        let event = ActionParameters {
            payment_address: address.clone(),
            ..Default::default()
        };
        Ok(with_event(state, ctx, event, |values| {
            values.payment_address = address
        }))
    }
}

/// `addRefundAddress`: payer only, once.
pub struct AddRefundAddressHandler;

impl ActionHandler for AddRefundAddressHandler {
    fn apply(
        &self,
        current: Option<&ExtensionState>,
        ctx: &ActionContext<'_>,
    ) -> Result<ExtensionState, ExtensionError> {
        let address = ctx.parameters().refund_address.as_deref();
        check_address(address, "refundAddress")?;

        let state = require_state(current)?;
        require_signer(Party::Payer, ctx)?;
        if state.values.refund_address.is_some() {
            return Err(ExtensionError::FieldAlreadySet(AddressField::Refund));
        }

        let address = address.map(str::to_string);
        let event = ActionParameters {
            refund_address: address.clone(),
            ..Default::default()
        };
        Ok(with_event(state, ctx, event, |values| {
            values.refund_address = address
        }))
    }
}

/// `addFee`: payee only, once for the address/amount pair.
pub struct AddFeeHandler;

impl ActionHandler for AddFeeHandler {
    fn apply(
        &self,
        current: Option<&ExtensionState>,
        ctx: &ActionContext<'_>,
    ) -> Result<ExtensionState, ExtensionError> {
        let params = ctx.parameters();
        check_address(params.fee_address.as_deref(), "feeAddress")?;
        match params.fee_amount.as_deref() {
            Some(amount) if is_valid_amount(amount) => {}
            _ => return Err(ExtensionError::InvalidAmount("feeAmount")),
        }

        let state = require_state(current)?;
        require_signer(Party::Payee, ctx)?;
        if state.values.fee_address.is_some() || state.values.fee_amount.is_some() {
            return Err(ExtensionError::FieldAlreadySet(AddressField::Fee));
        }

        let fee_address = params.fee_address.clone();
        let fee_amount = params.fee_amount.clone();
        let event = ActionParameters {
            fee_address: fee_address.clone(),
            fee_amount: fee_amount.clone(),
            ..Default::default()
        };
        Ok(with_event(state, ctx, event, |values| {
            values.fee_address = fee_address;
            values.fee_amount = fee_amount;
        }))
    }
}

/// Register the four fee-reference actions under `id`.
pub(crate) fn register_fee_reference_handlers<R: CreationRules + 'static>(
    registry: &mut ExtensionRegistry,
    id: &str,
    version: &'static str,
    rules: R,
) {
    registry.register(id, ActionKind::Create, Arc::new(CreateHandler::new(version, rules)));
    registry.register(id, ActionKind::AddPaymentAddress, Arc::new(AddPaymentAddressHandler));
    registry.register(id, ActionKind::AddRefundAddress, Arc::new(AddRefundAddressHandler));
    registry.register(id, ActionKind::AddFee, Arc::new(AddFeeHandler));
}

// =============================================================================
// BUILDERS
// =============================================================================

/// Check the fields common to every fee-reference `create` action.
pub(crate) fn check_creation_parameters(params: &ActionParameters) -> Result<(), ExtensionError> {
    check_builder_address(params.payment_address.as_deref(), "paymentAddress")?;
    check_builder_address(params.refund_address.as_deref(), "refundAddress")?;
    check_builder_address(params.fee_address.as_deref(), "feeAddress")?;
    check_optional_amount(params.fee_amount.as_deref(), "feeAmount")
}

pub(crate) fn add_payment_address_action(
    id: &str,
    payment_address: &str,
) -> Result<ExtensionAction, ExtensionError> {
    check_builder_address(Some(payment_address), "paymentAddress")?;
    Ok(ExtensionAction::new(
        ActionKind::AddPaymentAddress,
        id,
        ActionParameters {
            payment_address: Some(payment_address.to_string()),
            ..Default::default()
        },
    ))
}

pub(crate) fn add_refund_address_action(
    id: &str,
    refund_address: &str,
) -> Result<ExtensionAction, ExtensionError> {
    check_builder_address(Some(refund_address), "refundAddress")?;
    Ok(ExtensionAction::new(
        ActionKind::AddRefundAddress,
        id,
        ActionParameters {
            refund_address: Some(refund_address.to_string()),
            ..Default::default()
        },
    ))
}

pub(crate) fn add_fee_action(
    id: &str,
    fee_address: &str,
    fee_amount: &str,
) -> Result<ExtensionAction, ExtensionError> {
    check_builder_address(Some(fee_address), "feeAddress")?;
    check_optional_amount(Some(fee_amount), "feeAmount")?;
    Ok(ExtensionAction::new(
        ActionKind::AddFee,
        id,
        ActionParameters {
            fee_address: Some(fee_address.to_string()),
            fee_amount: Some(fee_amount.to_string()),
            ..Default::default()
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PAYMENT_NETWORK_ANY_ERC20_CONVERSION_FEE_PROXY_CONTRACT as ID;
    use crate::extensions::conversion_fee_proxy::ConversionRules;
    use crate::test_data::*;
    use crate::domain::Request;
    use shared_types::Identity;

    fn apply(
        handler: &dyn ActionHandler,
        request: &Request,
        action: &ExtensionAction,
        signer: &Identity,
    ) -> Result<ExtensionState, ExtensionError> {
        let ctx = ActionContext {
            action,
            request,
            signer,
            timestamp: ARBITRARY_TIMESTAMP,
        };
        handler.apply(request.extension(ID), &ctx)
    }

    fn create_handler() -> CreateHandler<ConversionRules> {
        CreateHandler::new("0.1.0", ConversionRules)
    }

    #[test]
    fn test_create_copies_parameters_with_empty_log() {
        let request = request_no_extensions();
        let state = apply(&create_handler(), &request, &action_creation_full(), &other_id())
            .unwrap();
        assert_eq!(state, extension_state(creation_parameters_full(), Vec::new()));
    }

    #[test]
    fn test_create_defaults_version_when_action_has_none() {
        let request = request_no_extensions();
        let mut action = action_creation_full();
        action.version = None;
        let handler = CreateHandler::new("0.2.0", ConversionRules);
        let state = apply(&handler, &request, &action, &other_id()).unwrap();
        assert_eq!(state.version, "0.2.0");
    }

    #[test]
    fn test_create_twice_fails() {
        let request = request_full_state_created();
        assert_eq!(
            apply(&create_handler(), &request, &action_creation_full(), &other_id()),
            Err(ExtensionError::AlreadyCreated)
        );
    }

    #[test]
    fn test_create_twice_fails_whatever_the_parameters() {
        let request = request_full_state_created();
        let mut no_tokens = action_creation_full();
        no_tokens.parameters.tokens_accepted = None;
        let mut bad_address = action_creation_full();
        bad_address.parameters.payment_address = Some("nope".into());
        let mut bad_network = action_creation_full();
        bad_network.parameters.network = Some("unknown-network".into());

        for action in [no_tokens, bad_address, bad_network] {
            assert_eq!(
                apply(&create_handler(), &request, &action, &other_id()),
                Err(ExtensionError::AlreadyCreated)
            );
        }
    }

    #[test]
    fn test_create_rejects_invalid_addresses() {
        let request = request_no_extensions();
        for (field, message) in [
            ("payment", "paymentAddress is not a valid address"),
            ("refund", "refundAddress is not a valid address"),
            ("fee", "feeAddress is not a valid address"),
        ] {
            let mut action = action_creation_full();
            let slot = match field {
                "payment" => &mut action.parameters.payment_address,
                "refund" => &mut action.parameters.refund_address,
                _ => &mut action.parameters.fee_address,
            };
            *slot = Some(INVALID_ADDRESS.into());
            let err = apply(&create_handler(), &request, &action, &other_id()).unwrap_err();
            assert_eq!(err.to_string(), message);
        }
    }

    #[test]
    fn test_create_rejects_token_lists() {
        let request = request_no_extensions();

        let mut action = action_creation_full();
        action.parameters.tokens_accepted = Some(Vec::new());
        assert_eq!(
            apply(&create_handler(), &request, &action, &other_id()),
            Err(ExtensionError::MissingTokensAccepted)
        );

        action.parameters.tokens_accepted = Some(vec!["invalid address".into()]);
        assert_eq!(
            apply(&create_handler(), &request, &action, &other_id()),
            Err(ExtensionError::InvalidTokenList)
        );
    }

    #[test]
    fn test_add_payment_address_appends_event() {
        let request = request_state_created_empty();
        let state = apply(
            &AddPaymentAddressHandler,
            &request,
            &action_add_payment_address(),
            &payee(),
        )
        .unwrap();

        assert_eq!(state.values.payment_address.as_deref(), Some(ADDRESS_1));
        assert_eq!(
            state.events,
            vec![ExtensionEvent {
                name: "addPaymentAddress".into(),
                parameters: ActionParameters {
                    payment_address: Some(ADDRESS_1.into()),
                    ..Default::default()
                },
                timestamp: ARBITRARY_TIMESTAMP,
            }]
        );
        // input untouched
        assert_eq!(request.extension(ID).unwrap().events.len(), 0);
    }

    #[test]
    fn test_add_payment_address_sequencing() {
        let action = action_add_payment_address();

        let request = request_no_extensions();
        assert_eq!(
            apply(&AddPaymentAddressHandler, &request, &action, &payee()),
            Err(ExtensionError::Uncreated)
        );

        let mut request = request_state_created_empty();
        request.payee = None;
        assert_eq!(
            apply(&AddPaymentAddressHandler, &request, &action, &payee())
                .unwrap_err()
                .to_string(),
            "The request must have a payee"
        );

        let request = request_state_created_empty();
        assert_eq!(
            apply(&AddPaymentAddressHandler, &request, &action, &payer())
                .unwrap_err()
                .to_string(),
            "The signer must be the payee"
        );

        let request = request_full_state_created();
        assert_eq!(
            apply(&AddPaymentAddressHandler, &request, &action, &payee())
                .unwrap_err()
                .to_string(),
            "Payment address already given"
        );
    }

    #[test]
    fn test_add_payment_address_validates_before_sequencing() {
        let mut action = action_add_payment_address();
        action.parameters.payment_address = Some(INVALID_ADDRESS.into());
        // wrong signer and already set, but the format error wins
        let request = request_full_state_created();
        assert_eq!(
            apply(&AddPaymentAddressHandler, &request, &action, &payer()),
            Err(ExtensionError::InvalidAddress("paymentAddress"))
        );
    }

    #[test]
    fn test_add_refund_address() {
        let action = action_add_refund_address();
        let request = request_state_created_empty();
        let state = apply(&AddRefundAddressHandler, &request, &action, &payer()).unwrap();
        assert_eq!(state.values.refund_address.as_deref(), Some(ADDRESS_2));
        assert_eq!(state.events[0].name, "addRefundAddress");

        assert_eq!(
            apply(&AddRefundAddressHandler, &request, &action, &payee())
                .unwrap_err()
                .to_string(),
            "The signer must be the payer"
        );

        let mut no_payer = request_state_created_empty();
        no_payer.payer = None;
        assert_eq!(
            apply(&AddRefundAddressHandler, &no_payer, &action, &payer())
                .unwrap_err()
                .to_string(),
            "The request must have a payer"
        );

        assert_eq!(
            apply(
                &AddRefundAddressHandler,
                &request_full_state_created(),
                &action,
                &payer()
            )
            .unwrap_err()
            .to_string(),
            "Refund address already given"
        );

        let mut invalid = action_add_refund_address();
        invalid.parameters.refund_address = Some(INVALID_ADDRESS.into());
        assert_eq!(
            apply(&AddRefundAddressHandler, &request, &invalid, &payee())
                .unwrap_err()
                .to_string(),
            "refundAddress is not a valid address"
        );
    }

    #[test]
    fn test_add_fee() {
        let action = action_add_fee();
        let request = request_state_created_empty();
        let state = apply(&AddFeeHandler, &request, &action, &payee()).unwrap();
        assert_eq!(state.values.fee_address.as_deref(), Some(ADDRESS_3));
        assert_eq!(state.values.fee_amount.as_deref(), Some("2000"));
        assert_eq!(state.events[0].parameters, action.parameters);

        assert_eq!(
            apply(&AddFeeHandler, &request, &action, &payer())
                .unwrap_err()
                .to_string(),
            "The signer must be the payee"
        );
        assert_eq!(
            apply(&AddFeeHandler, &request_full_state_created(), &action, &payee())
                .unwrap_err()
                .to_string(),
            "Fee address already given"
        );
        assert_eq!(
            apply(&AddFeeHandler, &request_no_extensions(), &action, &payee()),
            Err(ExtensionError::Uncreated)
        );
    }

    #[test]
    fn test_add_fee_validates_parameters() {
        let request = request_state_created_empty();

        let mut action = action_add_fee();
        action.parameters.fee_address = Some(INVALID_ADDRESS.into());
        assert_eq!(
            apply(&AddFeeHandler, &request, &action, &payer())
                .unwrap_err()
                .to_string(),
            "feeAddress is not a valid address"
        );

        let mut action = action_add_fee();
        action.parameters.fee_amount = Some(INVALID_ADDRESS.into());
        assert_eq!(
            apply(&AddFeeHandler, &request, &action, &payer())
                .unwrap_err()
                .to_string(),
            "feeAmount is not a valid amount"
        );

        let mut action = action_add_fee();
        action.parameters.fee_amount = None;
        assert_eq!(
            apply(&AddFeeHandler, &request, &action, &payee()),
            Err(ExtensionError::InvalidAmount("feeAmount"))
        );
    }
}
