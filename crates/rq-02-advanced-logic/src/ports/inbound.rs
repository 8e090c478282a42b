//! # Inbound Ports (Driving Ports)

use shared_types::{Identity, Timestamp};

use crate::domain::{ExtensionAction, ExtensionError, ExtensionsState, Request};

/// Primary API of the Advanced Logic subsystem, consumed by the request
/// reducer for every extension action found in a transaction.
pub trait AdvancedLogicApi: Send + Sync {
    /// Apply `action` to the extensions of `request`.
    ///
    /// Pure: returns the new extensions state and never modifies
    /// `extensions_state`. On error nothing is applied.
    fn apply_action_to_extensions(
        &self,
        extensions_state: &ExtensionsState,
        action: &ExtensionAction,
        request: &Request,
        action_signer: &Identity,
        timestamp: Timestamp,
    ) -> Result<ExtensionsState, ExtensionError>;
}
