//! # Inbound Ports (Driving Ports)

use async_trait::async_trait;
use rq_02_advanced_logic::{ActionParameters, ExtensionAction, Request};

use crate::domain::{BalanceWithEvents, PaymentDetectionError};

/// Payment network facade used by request clients.
#[async_trait]
pub trait PaymentNetworkApi: Send + Sync {
    /// Build the `create` action, generating a salt when none is given.
    fn create_extensions_data_for_creation(
        &self,
        parameters: ActionParameters,
    ) -> Result<ExtensionAction, PaymentDetectionError>;

    fn create_extensions_data_for_add_payment_information(
        &self,
        payment_address: &str,
    ) -> Result<ExtensionAction, PaymentDetectionError>;

    fn create_extensions_data_for_add_refund_information(
        &self,
        refund_address: &str,
    ) -> Result<ExtensionAction, PaymentDetectionError>;

    fn create_extensions_data_for_add_fee_information(
        &self,
        fee_address: &str,
        fee_amount: &str,
    ) -> Result<ExtensionAction, PaymentDetectionError>;

    /// Balance, fee balance and events of `request`.
    ///
    /// Never fails: errors are reported in [`BalanceWithEvents::error`].
    async fn get_balance(&self, request: &Request) -> BalanceWithEvents;
}
