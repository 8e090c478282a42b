//! # Extension Ports
//!
//! Seams through which payment networks plug into the registry.

use shared_types::{Identity, Timestamp};

use crate::domain::{ActionParameters, ExtensionAction, ExtensionError, ExtensionState, Request};

/// Everything an action handler may look at.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub action: &'a ExtensionAction,
    pub request: &'a Request,
    pub signer: &'a Identity,
    pub timestamp: Timestamp,
}

impl<'a> ActionContext<'a> {
    pub fn parameters(&self) -> &'a ActionParameters {
        &self.action.parameters
    }
}

/// Handler for one action kind of one extension.
pub trait ActionHandler: Send + Sync {
    /// Compute the next state of the extension.
    ///
    /// `current` is `None` when the extension has not been created yet.
    fn apply(
        &self,
        current: Option<&ExtensionState>,
        ctx: &ActionContext<'_>,
    ) -> Result<ExtensionState, ExtensionError>;
}

/// Payment-network specific checks run when an extension is created.
pub trait CreationRules: Send + Sync {
    /// Check the request currency, network and network-specific parameters.
    fn validate(
        &self,
        parameters: &ActionParameters,
        request: &Request,
    ) -> Result<(), ExtensionError>;
}
