//! # Ports Module

pub mod extension;
pub mod inbound;

pub use extension::{ActionContext, ActionHandler, CreationRules};
pub use inbound::AdvancedLogicApi;
