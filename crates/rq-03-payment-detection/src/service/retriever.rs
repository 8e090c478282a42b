//! # Conversion Proxy Event Retriever
//!
//! Finds the transfers made through the conversion proxy for one payment
//! reference and one destination.
//!
//! The conversion proxy emits `TransferWithConversionAndReference` (amounts
//! in request currency) and calls the fee proxy, which emits
//! `TransferWithReferenceAndFee` (amounts in tokens) in the same
//! transaction. Logs of both streams are paired by transaction hash; a
//! conversion log without its fee-proxy log is an error.
//!
//! A pair is kept when:
//! - its `maxRateTimespan` is at most the configured ceiling,
//! - its conversion currency is the request currency,
//! - its fee-proxy `to` is the destination address.

use futures::stream::{self, StreamExt, TryStreamExt};
use primitive_types::U256;
use shared_types::same_address;
use std::sync::Arc;
use tracing::debug;

use crate::config::{ProxyDeployment, DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_MAX_RATE_TIMESPAN};
use crate::domain::{
    address_to_string, event_topic, payment_reference_topic, BlockNumber, BlockTag,
    ConversionTransfer, CurrencyDefinition, FeeProxyTransfer, Hash, Log, LogFilter,
    PaymentDetectionError, PaymentEvent, PaymentEventName, PaymentEventParameters,
    CONVERSION_EVENT_SIGNATURE, FEE_PROXY_EVENT_SIGNATURE,
};
use crate::ports::LedgerProvider;

/// A conversion log and the fee-proxy log of the same transaction.
#[derive(Debug, Clone, Copy)]
struct PairedTransfer {
    block: BlockNumber,
    tx_hash: Hash,
    conversion: ConversionTransfer,
    transfer: FeeProxyTransfer,
}

pub struct ConversionInfoRetriever {
    ledger: Arc<dyn LedgerProvider>,
    currency: CurrencyDefinition,
    payment_reference: String,
    proxy: ProxyDeployment,
    to_address: String,
    event_name: PaymentEventName,
    max_rate_timespan: u64,
    max_concurrent_requests: usize,
}

impl ConversionInfoRetriever {
    pub fn new(
        ledger: Arc<dyn LedgerProvider>,
        currency: CurrencyDefinition,
        payment_reference: impl Into<String>,
        proxy: ProxyDeployment,
        to_address: impl Into<String>,
        event_name: PaymentEventName,
    ) -> Self {
        Self {
            ledger,
            currency,
            payment_reference: payment_reference.into(),
            proxy,
            to_address: to_address.into(),
            event_name,
            max_rate_timespan: DEFAULT_MAX_RATE_TIMESPAN,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }

    /// Ceiling on the `maxRateTimespan` declared by kept events.
    pub fn with_max_rate_timespan(mut self, max_rate_timespan: u64) -> Self {
        self.max_rate_timespan = max_rate_timespan;
        self
    }

    pub fn with_max_concurrent_requests(mut self, max_concurrent_requests: usize) -> Self {
        self.max_concurrent_requests = max_concurrent_requests.max(1);
        self
    }

    fn filter(&self, signature: &str, reference: Hash) -> LogFilter {
        LogFilter {
            address: self.proxy.address,
            topics: vec![Some(event_topic(signature)), Some(reference)],
            from_block: self.proxy.creation_block,
            to_block: BlockTag::Latest,
        }
    }

    /// Events sent to the destination, in conversion-log order.
    pub async fn get_transfer_events(&self) -> Result<Vec<PaymentEvent>, PaymentDetectionError> {
        let reference = payment_reference_topic(&self.payment_reference)?;
        let conversion_filter = self.filter(CONVERSION_EVENT_SIGNATURE, reference);
        let fee_filter = self.filter(FEE_PROXY_EVENT_SIGNATURE, reference);

        let (conversion_logs, fee_logs) = tokio::try_join!(
            self.ledger.get_logs(&conversion_filter),
            self.ledger.get_logs(&fee_filter),
        )?;

        let paired = conversion_logs
            .iter()
            .map(|log| pair(log, &fee_logs))
            .collect::<Result<Vec<_>, _>>()?;
        let total = paired.len();
        let kept: Vec<PairedTransfer> = paired.into_iter().filter(|p| self.accepts(p)).collect();

        debug!(
            "[rq-03] Reference {}: {} conversion logs, {} {} events kept",
            self.payment_reference,
            total,
            kept.len(),
            self.event_name
        );

        stream::iter(kept)
            .map(|paired| self.to_event(paired))
            .buffered(self.max_concurrent_requests)
            .try_collect()
            .await
    }

    fn accepts(&self, paired: &PairedTransfer) -> bool {
        paired.conversion.max_rate_timespan <= U256::from(self.max_rate_timespan)
            && self.currency.is_identified_by(&paired.conversion.currency)
            && same_address(&address_to_string(&paired.transfer.to), &self.to_address)
    }

    async fn to_event(&self, paired: PairedTransfer) -> Result<PaymentEvent, PaymentDetectionError> {
        let timestamp = self.ledger.get_block_timestamp(paired.block).await?;
        let PairedTransfer {
            block,
            tx_hash,
            conversion,
            transfer,
        } = paired;

        Ok(PaymentEvent {
            amount: self.currency.unpad_from_price_feed(conversion.amount).to_string(),
            name: self.event_name,
            parameters: PaymentEventParameters {
                block,
                tx_hash,
                to: self.to_address.clone(),
                fee_address: Some(address_to_string(&transfer.fee_address)),
                fee_amount: Some(
                    self.currency
                        .unpad_from_price_feed(conversion.fee_amount)
                        .to_string(),
                ),
                amount_in_crypto: Some(transfer.amount.to_string()),
                fee_amount_in_crypto: Some(transfer.fee_amount.to_string()),
                max_rate_timespan: Some(conversion.max_rate_timespan.to_string()),
            },
            timestamp,
        })
    }
}

fn pair(conversion_log: &Log, fee_logs: &[Log]) -> Result<PairedTransfer, PaymentDetectionError> {
    let tx_hash = conversion_log.transaction_hash;
    let conversion = ConversionTransfer::decode(&conversion_log.data).ok_or(
        PaymentDetectionError::MalformedLog {
            event: ConversionTransfer::NAME,
            tx_hash,
        },
    )?;
    let fee_log = fee_logs
        .iter()
        .find(|log| log.transaction_hash == tx_hash)
        .ok_or(PaymentDetectionError::ProxyLogNotFound(tx_hash))?;
    let transfer =
        FeeProxyTransfer::decode(&fee_log.data).ok_or(PaymentDetectionError::MalformedLog {
            event: FeeProxyTransfer::NAME,
            tx_hash,
        })?;

    Ok(PairedTransfer {
        block: conversion_log.block_number,
        tx_hash,
        conversion,
        transfer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{tx_hash, MockLedger};
    use crate::domain::{payment_reference, Address};
    use shared_types::{Currency, CurrencyType};

    const REFERENCE: &str = "aabbccddeeff0011";
    const TO: &str = "0xf17f52151EbEF6C7334FAD080c5704D77216b732";

    fn to_address() -> Address {
        Address::from_slice(&hex::decode(&TO[2..]).unwrap())
    }

    fn eur() -> CurrencyDefinition {
        CurrencyDefinition::with_default_decimals(Currency::new(CurrencyType::Iso4217, "EUR"))
    }

    fn eur_address() -> Address {
        Address::from_slice(&hex::decode(&eur().hash()[2..]).unwrap())
    }

    fn deployment() -> ProxyDeployment {
        ProxyDeployment {
            address: Address::repeat_byte(0xcc),
            creation_block: 1,
        }
    }

    fn conversion(amount_cents: u64, timespan: u64) -> ConversionTransfer {
        ConversionTransfer {
            amount: U256::from(amount_cents) * U256::exp10(6),
            currency: eur_address(),
            fee_amount: U256::from(2u64) * U256::exp10(6),
            max_rate_timespan: U256::from(timespan),
        }
    }

    fn transfer(to: Address) -> FeeProxyTransfer {
        FeeProxyTransfer {
            to,
            amount: U256::from(1_000_000u64),
            fee_amount: U256::from(20_000u64),
            fee_address: Address::repeat_byte(0x0f),
        }
    }

    fn retriever(ledger: Arc<MockLedger>) -> ConversionInfoRetriever {
        ConversionInfoRetriever::new(
            ledger,
            eur(),
            REFERENCE,
            deployment(),
            TO,
            PaymentEventName::Payment,
        )
    }

    fn push(ledger: &MockLedger, block: u64, seed: u64, c: ConversionTransfer, t: FeeProxyTransfer) {
        ledger
            .push_conversion_payment(deployment().address, REFERENCE, block, tx_hash(seed), c, t)
            .unwrap();
        ledger.set_block_timestamp(block, 1_000 + block);
    }

    #[tokio::test]
    async fn test_event_fields() {
        let ledger = Arc::new(MockLedger::new());
        push(&ledger, 5, 1, conversion(10_000, 0), transfer(to_address()));

        let events = retriever(ledger).get_transfer_events().await.unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.amount, "10000");
        assert_eq!(event.name, PaymentEventName::Payment);
        assert_eq!(event.timestamp, 1_005);
        assert_eq!(event.parameters.block, 5);
        assert_eq!(event.parameters.tx_hash, tx_hash(1));
        assert_eq!(event.parameters.to, TO);
        assert_eq!(event.parameters.fee_amount.as_deref(), Some("2"));
        assert_eq!(event.parameters.amount_in_crypto.as_deref(), Some("1000000"));
        assert_eq!(event.parameters.fee_amount_in_crypto.as_deref(), Some("20000"));
        assert_eq!(event.parameters.max_rate_timespan.as_deref(), Some("0"));
        assert!(same_address(
            event.parameters.fee_address.as_deref().unwrap(),
            "0x0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f"
        ));
    }

    #[tokio::test]
    async fn test_other_destination_and_currency_are_ignored() {
        let ledger = Arc::new(MockLedger::new());
        push(&ledger, 5, 1, conversion(100, 0), transfer(Address::repeat_byte(9)));

        let mut usd = conversion(200, 0);
        usd.currency = Address::repeat_byte(0x77);
        push(&ledger, 6, 2, usd, transfer(to_address()));

        push(&ledger, 7, 3, conversion(300, 0), transfer(to_address()));

        let events = retriever(ledger).get_transfer_events().await.unwrap();
        assert_eq!(
            events.iter().map(|e| e.amount.as_str()).collect::<Vec<_>>(),
            vec!["300"]
        );
    }

    #[tokio::test]
    async fn test_rate_timespan_ceiling() {
        let ledger = Arc::new(MockLedger::new());
        push(&ledger, 5, 1, conversion(100, 0), transfer(to_address()));
        push(&ledger, 6, 2, conversion(200, 60), transfer(to_address()));
        push(&ledger, 7, 3, conversion(300, 61), transfer(to_address()));

        // default ceiling keeps only events declaring 0
        let events = retriever(ledger.clone()).get_transfer_events().await.unwrap();
        assert_eq!(events.len(), 1);

        let events = retriever(ledger)
            .with_max_rate_timespan(60)
            .get_transfer_events()
            .await
            .unwrap();
        assert_eq!(
            events.iter().map(|e| e.amount.as_str()).collect::<Vec<_>>(),
            vec!["100", "200"]
        );
    }

    #[tokio::test]
    async fn test_missing_proxy_log_is_an_error() {
        let ledger = Arc::new(MockLedger::new());
        let reference = payment_reference_topic(REFERENCE).unwrap();
        ledger.push_log(Log {
            address: deployment().address,
            topics: vec![event_topic(CONVERSION_EVENT_SIGNATURE), reference],
            data: conversion(100, 0).encode(),
            block_number: 5,
            transaction_hash: tx_hash(1),
        });

        let err = retriever(ledger).get_transfer_events().await.unwrap_err();
        assert_eq!(err, PaymentDetectionError::ProxyLogNotFound(tx_hash(1)));
    }

    #[tokio::test]
    async fn test_logs_before_creation_block_or_other_reference_are_ignored() {
        let ledger = Arc::new(MockLedger::new());
        ledger
            .push_conversion_payment(
                deployment().address,
                REFERENCE,
                0,
                tx_hash(1),
                conversion(100, 0),
                transfer(to_address()),
            )
            .unwrap();
        let other = payment_reference("01ab", "salt", TO);
        ledger
            .push_conversion_payment(
                deployment().address,
                &other,
                5,
                tx_hash(2),
                conversion(100, 0),
                transfer(to_address()),
            )
            .unwrap();

        assert!(retriever(ledger).get_transfer_events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ledger_failure_propagates() {
        let ledger = Arc::new(MockLedger::new());
        push(&ledger, 5, 1, conversion(100, 0), transfer(to_address()));
        ledger.fail_next(1);
        assert!(matches!(
            retriever(ledger).get_transfer_events().await,
            Err(PaymentDetectionError::Ledger(_))
        ));
    }
}
