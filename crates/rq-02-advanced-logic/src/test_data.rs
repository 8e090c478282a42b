//! Fixtures shared by the unit tests of this crate.

use shared_types::{Currency, CurrencyType, Identity, Timestamp};

use crate::domain::{
    ActionKind, ActionParameters, ExtensionAction, ExtensionEvent, ExtensionState, ExtensionType,
    ExtensionsState, Request, PAYMENT_NETWORK_ANY_ERC20_CONVERSION_FEE_PROXY_CONTRACT as ID,
};

pub const ADDRESS_1: &str = "0x0000000000000000000000000000000000000001";
pub const ADDRESS_2: &str = "0x0000000000000000000000000000000000000002";
pub const ADDRESS_3: &str = "0x0000000000000000000000000000000000000003";
pub const ADDRESS_4: &str = "0x0000000000000000000000000000000000000004";
pub const ADDRESS_5: &str = "0x0000000000000000000000000000000000000005";
pub const INVALID_ADDRESS: &str = "0x not and address";
pub const SALT: &str = "ea3bc7caf64110ca";
pub const ARBITRARY_TIMESTAMP: Timestamp = 1_544_426_030;

pub fn payee() -> Identity {
    Identity::ethereum_address("0xaf083f77f1ffd54218d91491afd06c9296eac3ce")
}

pub fn payer() -> Identity {
    Identity::ethereum_address("0x740fc87bd3f41d07d23a01dec90623ebc5fed9d6")
}

pub fn other_id() -> Identity {
    Identity::ethereum_address("0x818b6337657a23f58581715fc610577292e521d0")
}

pub fn request_no_extensions() -> Request {
    Request {
        request_id: "011c2610cbc127d8e1e1ad1d6bbd2e3d4b1fd2a7e12d4fbce4bd1b7b0c5e0a8e0c".into(),
        currency: Currency::new(CurrencyType::Iso4217, "EUR"),
        payee: Some(payee()),
        payer: Some(payer()),
        expected_amount: "123400000000000000".into(),
        extensions: ExtensionsState::new(),
        timestamp: ARBITRARY_TIMESTAMP,
    }
}

pub fn creation_parameters_full() -> ActionParameters {
    ActionParameters {
        fee_address: Some(ADDRESS_1.into()),
        fee_amount: Some("1000".into()),
        payment_address: Some(ADDRESS_2.into()),
        refund_address: Some(ADDRESS_3.into()),
        salt: Some(SALT.into()),
        network: Some("rinkeby".into()),
        tokens_accepted: Some(vec![ADDRESS_4.into(), ADDRESS_5.into()]),
        max_rate_timespan: Some(1_000_000),
    }
}

pub fn creation_parameters_empty() -> ActionParameters {
    ActionParameters {
        network: Some("rinkeby".into()),
        tokens_accepted: Some(vec![ADDRESS_4.into()]),
        ..Default::default()
    }
}

pub fn action_creation_full() -> ExtensionAction {
    ExtensionAction::new(ActionKind::Create, ID, creation_parameters_full()).with_version("0.1.0")
}

pub fn action_creation_empty() -> ExtensionAction {
    ExtensionAction::new(ActionKind::Create, ID, creation_parameters_empty())
        .with_version("0.1.0")
}

pub fn extension_state(values: ActionParameters, events: Vec<ExtensionEvent>) -> ExtensionState {
    ExtensionState {
        id: ID.into(),
        extension_type: ExtensionType::PaymentNetwork,
        version: "0.1.0".into(),
        values,
        events,
    }
}

fn with_extension(state: ExtensionState) -> Request {
    let mut request = request_no_extensions();
    request.extensions.insert(ID.into(), state);
    request
}

/// Conversion extension created with every field set.
pub fn request_full_state_created() -> Request {
    with_extension(extension_state(creation_parameters_full(), Vec::new()))
}

/// Conversion extension created with no address and no fee.
pub fn request_state_created_empty() -> Request {
    with_extension(extension_state(creation_parameters_empty(), Vec::new()))
}

pub fn action_add_payment_address() -> ExtensionAction {
    ExtensionAction::new(
        ActionKind::AddPaymentAddress,
        ID,
        ActionParameters {
            payment_address: Some(ADDRESS_1.into()),
            ..Default::default()
        },
    )
}

pub fn action_add_refund_address() -> ExtensionAction {
    ExtensionAction::new(
        ActionKind::AddRefundAddress,
        ID,
        ActionParameters {
            refund_address: Some(ADDRESS_2.into()),
            ..Default::default()
        },
    )
}

pub fn action_add_fee() -> ExtensionAction {
    ExtensionAction::new(
        ActionKind::AddFee,
        ID,
        ActionParameters {
            fee_address: Some(ADDRESS_3.into()),
            fee_amount: Some("2000".into()),
            ..Default::default()
        },
    )
}
