//! # Request and Extension State
//!
//! The subset of a request the extension state machines read, and the
//! per-extension state they produce.

use serde::{Deserialize, Serialize};
use shared_types::{Currency, Identity, Timestamp};
use std::collections::BTreeMap;

use super::action::{ActionParameters, PaymentNetworkValues};

/// Extension id → extension state.
pub type ExtensionsState = BTreeMap<String, ExtensionState>;

/// Family of an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtensionType {
    #[serde(rename = "payment-network")]
    PaymentNetwork,
}

/// One entry of an extension's event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionEvent {
    /// Wire name of the action that produced the event.
    pub name: String,
    pub parameters: ActionParameters,
    pub timestamp: Timestamp,
}

/// State of one extension of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionState {
    pub id: String,
    #[serde(rename = "type")]
    pub extension_type: ExtensionType,
    pub version: String,
    pub values: PaymentNetworkValues,
    pub events: Vec<ExtensionEvent>,
}

/// A request as seen by the extension state machines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub request_id: String,
    pub currency: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<Identity>,
    pub expected_amount: String,
    #[serde(default)]
    pub extensions: ExtensionsState,
    pub timestamp: Timestamp,
}

impl Request {
    pub fn extension(&self, id: &str) -> Option<&ExtensionState> {
        self.extensions.get(id)
    }
}
