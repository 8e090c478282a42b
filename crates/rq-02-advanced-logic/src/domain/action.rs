//! # Extension Actions
//!
//! An action is one state-transition instruction for one extension of a
//! request. Actions travel as JSON inside request transactions:
//!
//! ```text
//! { "action": "addPaymentAddress", "id": "pn-...", "parameters": { ... }, "version": "0.1.0" }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Id of the "any currency to ERC20" conversion fee-proxy payment network.
pub const PAYMENT_NETWORK_ANY_ERC20_CONVERSION_FEE_PROXY_CONTRACT: &str =
    "pn-any-erc20-conversion-fee-proxy-contract";

/// Id of the ERC20 fee-proxy payment network.
pub const PAYMENT_NETWORK_ERC20_FEE_PROXY_CONTRACT: &str = "pn-erc20-fee-proxy-contract";

/// Kinds of action understood by fee-reference-based extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    Create,
    AddPaymentAddress,
    AddRefundAddress,
    AddFee,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Create,
        ActionKind::AddPaymentAddress,
        ActionKind::AddRefundAddress,
        ActionKind::AddFee,
    ];

    /// Wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Create => "create",
            ActionKind::AddPaymentAddress => "addPaymentAddress",
            ActionKind::AddRefundAddress => "addRefundAddress",
            ActionKind::AddFee => "addFee",
        }
    }

    /// Resolve a wire name, `None` if unknown.
    pub fn parse(action: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == action)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a fee-reference-based payment network.
///
/// Used both as action parameters and as the `values` of an extension
/// state. Absent fields are omitted from the JSON form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentNetworkValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_amount: Option<String>,
    /// Mixed into the payment reference so it cannot be guessed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    /// Token addresses the payer may pay with (conversion networks only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_accepted: Option<Vec<String>>,
    /// Maximum age, in seconds, of the conversion rate used on chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rate_timespan: Option<u64>,
}

/// Parameters carried by an action.
pub type ActionParameters = PaymentNetworkValues;

/// One action targeting one extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionAction {
    /// Wire name of the action (see [`ActionKind`]). Kept as a string so
    /// unknown actions can be reported as such.
    pub action: String,
    /// Extension id.
    pub id: String,
    pub parameters: ActionParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ExtensionAction {
    pub fn new(kind: ActionKind, id: impl Into<String>, parameters: ActionParameters) -> Self {
        Self {
            action: kind.as_str().to_string(),
            id: id.into(),
            parameters,
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn kind(&self) -> Option<ActionKind> {
        ActionKind::parse(&self.action)
    }
}
