//! Ledger-backed [`BalanceSource`].

use async_trait::async_trait;
use rq_02_advanced_logic::conversion_fee_proxy::DEFAULT_NETWORK;
use rq_02_advanced_logic::{ExtensionState, Request};
use std::sync::Arc;

use super::retriever::ConversionInfoRetriever;
use crate::config::ConversionFeeProxyConfig;
use crate::domain::balance::sum_amounts;
use crate::domain::{
    payment_reference, CurrencyDefinition, EventsWithBalance, PaymentDetectionError,
    PaymentEventName,
};
use crate::ports::{BalanceSource, LedgerProvider};

/// Queries the conversion proxy deployment of the extension's network.
pub struct LedgerBalanceSource {
    ledger: Arc<dyn LedgerProvider>,
    config: ConversionFeeProxyConfig,
}

impl LedgerBalanceSource {
    pub fn new(ledger: Arc<dyn LedgerProvider>, config: ConversionFeeProxyConfig) -> Self {
        Self { ledger, config }
    }
}

#[async_trait]
impl BalanceSource for LedgerBalanceSource {
    async fn extract_balance_and_events(
        &self,
        request: &Request,
        extension: &ExtensionState,
        salt: Option<&str>,
        to_address: &str,
        event_name: PaymentEventName,
    ) -> Result<EventsWithBalance, PaymentDetectionError> {
        let salt = salt.ok_or(PaymentDetectionError::MissingValue("salt"))?;
        let values = &extension.values;
        let network = values.network.as_deref().unwrap_or(DEFAULT_NETWORK);
        let deployment = self
            .config
            .deployment(network)
            .ok_or_else(|| PaymentDetectionError::UnsupportedNetwork(network.to_string()))?;

        let retriever = ConversionInfoRetriever::new(
            self.ledger.clone(),
            CurrencyDefinition::with_default_decimals(request.currency.clone()),
            payment_reference(&request.request_id, salt, to_address),
            deployment.clone(),
            to_address,
            event_name,
        )
        .with_max_rate_timespan(
            values
                .max_rate_timespan
                .unwrap_or(self.config.max_rate_timespan),
        )
        .with_max_concurrent_requests(self.config.max_concurrent_requests);

        let events = retriever.get_transfer_events().await?;
        Ok(EventsWithBalance {
            balance: sum_amounts(&events)?.to_string(),
            events,
        })
    }
}
