//! # Extension Registry
//!
//! Resolves `(action.id, action.action)` to a handler and applies it.
//!
//! ## Dispatch Order
//!
//! 1. No state for `action.id` and the action is not `create` → `Uncreated`.
//! 2. Unknown action name → `UnknownAction`.
//! 3. Unregistered extension id → `UnknownExtension`.
//! 4. Registered id without a handler for the action → `UnknownAction`.
//! 5. The handler's own checks.

use std::collections::BTreeMap;
use std::sync::Arc;

use shared_types::{Identity, Timestamp};
use tracing::debug;

use crate::domain::{ActionKind, ExtensionAction, ExtensionError, ExtensionsState, Request};
use crate::extensions::{conversion_fee_proxy, erc20_fee_proxy};
use crate::ports::{ActionContext, ActionHandler, AdvancedLogicApi};

type HandlerTable = BTreeMap<ActionKind, Arc<dyn ActionHandler>>;

/// Extension id → action handlers.
#[derive(Clone)]
pub struct ExtensionRegistry {
    extensions: BTreeMap<String, HandlerTable>,
}

impl ExtensionRegistry {
    /// Registry with every built-in payment network.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        conversion_fee_proxy::register(&mut registry);
        erc20_fee_proxy::register(&mut registry);
        registry
    }

    pub fn empty() -> Self {
        Self {
            extensions: BTreeMap::new(),
        }
    }

    /// Register `handler` for `kind` actions on extension `id`, replacing
    /// any previous handler.
    pub fn register(&mut self, id: &str, kind: ActionKind, handler: Arc<dyn ActionHandler>) {
        self.extensions
            .entry(id.to_string())
            .or_default()
            .insert(kind, handler);
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.extensions.contains_key(id)
    }

    pub fn extension_ids(&self) -> impl Iterator<Item = &str> {
        self.extensions.keys().map(String::as_str)
    }

    fn handler(&self, action: &ExtensionAction) -> Result<&dyn ActionHandler, ExtensionError> {
        let kind = action
            .kind()
            .ok_or_else(|| ExtensionError::UnknownAction(action.action.clone()))?;
        let table = self
            .extensions
            .get(&action.id)
            .ok_or_else(|| ExtensionError::UnknownExtension(action.id.clone()))?;
        table
            .get(&kind)
            .map(|handler| handler.as_ref())
            .ok_or_else(|| ExtensionError::UnknownAction(action.action.clone()))
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvancedLogicApi for ExtensionRegistry {
    fn apply_action_to_extensions(
        &self,
        extensions_state: &ExtensionsState,
        action: &ExtensionAction,
        request: &Request,
        action_signer: &Identity,
        timestamp: Timestamp,
    ) -> Result<ExtensionsState, ExtensionError> {
        let current = extensions_state.get(&action.id);
        if current.is_none() && action.kind() != Some(ActionKind::Create) {
            return Err(ExtensionError::Uncreated);
        }

        let handler = self.handler(action)?;
        let ctx = ActionContext {
            action,
            request,
            signer: action_signer,
            timestamp,
        };
        let next = handler.apply(current, &ctx).map_err(|e| {
            debug!("[rq-02] {} on {} rejected: {}", action.action, action.id, e);
            e
        })?;

        let mut extensions = extensions_state.clone();
        extensions.insert(action.id.clone(), next);
        debug!("[rq-02] Applied {} on {}", action.action, action.id);
        Ok(extensions)
    }
}
