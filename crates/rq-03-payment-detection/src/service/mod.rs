//! # Conversion Fee-Proxy Detector
//!
//! Facade over the `pn-any-erc20-conversion-fee-proxy-contract` payment
//! network: builds its actions and computes request balances.
//!
//! ## Balance
//!
//! - payments: events sent to `paymentAddress` (none when unset)
//! - refunds: events sent to `refundAddress` (none when unset)
//! - balance = Σ payments − Σ refunds
//! - fee balance = Σ fee amounts of payments and refunds paid to the
//!   extension's `feeAddress`
//!
//! Events of both directions are returned sorted by timestamp.

pub mod balance_source;
pub mod retriever;

pub use balance_source::LedgerBalanceSource;
pub use retriever::ConversionInfoRetriever;

use async_trait::async_trait;
use rq_02_advanced_logic::{
    conversion_fee_proxy, ActionParameters, ExtensionAction, ExtensionState, Request,
    PAYMENT_NETWORK_ANY_ERC20_CONVERSION_FEE_PROXY_CONTRACT as EXTENSION_ID,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::ConversionFeeProxyConfig;
use crate::domain::balance::{fee_balance, signed_balance};
use crate::domain::{
    BalanceError, BalanceWithEvents, EventsWithBalance, PaymentDetectionError, PaymentEventName,
};
use crate::ports::{BalanceSource, LedgerProvider, PaymentNetworkApi};

/// Length in bytes of generated salts.
pub const SALT_BYTES: usize = 8;

fn generate_salt() -> String {
    hex::encode(rand::random::<[u8; SALT_BYTES]>())
}

pub struct ConversionFeeProxyDetector {
    balance_source: Arc<dyn BalanceSource>,
}

impl ConversionFeeProxyDetector {
    /// Detector reading transfers from `ledger`.
    pub fn new(ledger: Arc<dyn LedgerProvider>, config: ConversionFeeProxyConfig) -> Self {
        Self::with_balance_source(Arc::new(LedgerBalanceSource::new(ledger, config)))
    }

    pub fn with_balance_source(balance_source: Arc<dyn BalanceSource>) -> Self {
        Self { balance_source }
    }

    async fn extract(
        &self,
        request: &Request,
        extension: &ExtensionState,
        to_address: Option<&str>,
        event_name: PaymentEventName,
    ) -> Result<EventsWithBalance, PaymentDetectionError> {
        let Some(to_address) = to_address else {
            return Ok(EventsWithBalance {
                balance: "0".to_string(),
                events: Vec::new(),
            });
        };
        self.balance_source
            .extract_balance_and_events(
                request,
                extension,
                extension.values.salt.as_deref(),
                to_address,
                event_name,
            )
            .await
    }

    async fn compute_balance(
        &self,
        request: &Request,
    ) -> Result<BalanceWithEvents, PaymentDetectionError> {
        let extension = request
            .extension(EXTENSION_ID)
            .ok_or_else(|| PaymentDetectionError::MissingExtension(EXTENSION_ID.to_string()))?;
        let values = &extension.values;

        let (payments, refunds) = tokio::try_join!(
            self.extract(
                request,
                extension,
                values.payment_address.as_deref(),
                PaymentEventName::Payment,
            ),
            self.extract(
                request,
                extension,
                values.refund_address.as_deref(),
                PaymentEventName::Refund,
            ),
        )?;

        let balance = signed_balance(&payments.balance, &refunds.balance)?;
        let mut events = payments.events;
        events.extend(refunds.events);
        events.sort_by_key(|event| event.timestamp);
        let fees = fee_balance(&events, values.fee_address.as_deref())?;

        info!(
            "[rq-03] Request {}: balance {}, fee balance {}, {} events",
            request.request_id,
            balance,
            fees,
            events.len()
        );

        Ok(BalanceWithEvents {
            balance: Some(balance),
            fee_balance: Some(fees.to_string()),
            events,
            error: None,
        })
    }
}

#[async_trait]
impl PaymentNetworkApi for ConversionFeeProxyDetector {
    fn create_extensions_data_for_creation(
        &self,
        mut parameters: ActionParameters,
    ) -> Result<ExtensionAction, PaymentDetectionError> {
        if parameters.salt.is_none() {
            parameters.salt = Some(generate_salt());
        }
        Ok(conversion_fee_proxy::create_creation_action(parameters)?)
    }

    fn create_extensions_data_for_add_payment_information(
        &self,
        payment_address: &str,
    ) -> Result<ExtensionAction, PaymentDetectionError> {
        Ok(conversion_fee_proxy::create_add_payment_address_action(
            payment_address,
        )?)
    }

    fn create_extensions_data_for_add_refund_information(
        &self,
        refund_address: &str,
    ) -> Result<ExtensionAction, PaymentDetectionError> {
        Ok(conversion_fee_proxy::create_add_refund_address_action(
            refund_address,
        )?)
    }

    fn create_extensions_data_for_add_fee_information(
        &self,
        fee_address: &str,
        fee_amount: &str,
    ) -> Result<ExtensionAction, PaymentDetectionError> {
        Ok(conversion_fee_proxy::create_add_fee_action(
            fee_address,
            fee_amount,
        )?)
    }

    async fn get_balance(&self, request: &Request) -> BalanceWithEvents {
        match self.compute_balance(request).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!("[rq-03] Balance of {} failed: {}", request.request_id, e);
                BalanceWithEvents::failed(BalanceError::from(&e))
            }
        }
    }
}
