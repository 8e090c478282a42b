//! End-to-end detection over the in-memory ledger: the request is built
//! with the extension reducer, payments are pushed as proxy logs.

use primitive_types::U256;
use proptest::prelude::*;
use rq_02_advanced_logic::{
    conversion_fee_proxy, ActionParameters, AdvancedLogicApi, ExtensionRegistry, ExtensionsState,
    Request,
};
use rq_03_payment_detection::{
    adapters::tx_hash, payment_reference, Address, BalanceErrorCode, ConversionFeeProxyConfig,
    ConversionFeeProxyDetector, ConversionTransfer, CurrencyDefinition, FeeProxyTransfer,
    MockLedger, PaymentEventName, PaymentNetworkApi,
};
use shared_types::{Currency, CurrencyType, Identity};
use std::sync::Arc;

const PAYEE: &str = "0xaf083f77f1ffd54218d91491afd06c9296eac3ce";
const PAYER: &str = "0x740fc87bd3f41d07d23a01dec90623ebc5fed9d6";
const PAYMENT_ADDRESS: &str = "0x0000000000000000000000000000000000000002";
const REFUND_ADDRESS: &str = "0x0000000000000000000000000000000000000003";
const FEE_ADDRESS: &str = "0x0000000000000000000000000000000000000001";
const SALT: &str = "ea3bc7caf64110ca";

fn address(value: &str) -> Address {
    Address::from_slice(&hex::decode(&value[2..]).unwrap())
}

fn eur() -> CurrencyDefinition {
    CurrencyDefinition::with_default_decimals(Currency::new(CurrencyType::Iso4217, "EUR"))
}

/// EUR request created through the reducer, on the `private` network.
fn created_request() -> Request {
    let mut request = Request {
        request_id: "01e273a3f7ee1e6ba8a1a6e43a42dd1d3e4b0f1c1a8c1e3dbe0e0b0f4c3b2a1d0e".into(),
        currency: Currency::new(CurrencyType::Iso4217, "EUR"),
        payee: Some(Identity::ethereum_address(PAYEE)),
        payer: Some(Identity::ethereum_address(PAYER)),
        expected_amount: "100000".into(),
        extensions: ExtensionsState::new(),
        timestamp: 1,
    };
    let create = conversion_fee_proxy::create_creation_action(ActionParameters {
        payment_address: Some(PAYMENT_ADDRESS.into()),
        refund_address: Some(REFUND_ADDRESS.into()),
        fee_address: Some(FEE_ADDRESS.into()),
        fee_amount: Some("100".into()),
        salt: Some(SALT.into()),
        network: Some("private".into()),
        tokens_accepted: Some(vec!["0x38cf23c52bb4b13f051aec09580a2de845a7fa35".into()]),
        max_rate_timespan: Some(600),
    })
    .unwrap();
    request.extensions = ExtensionRegistry::new()
        .apply_action_to_extensions(
            &request.extensions,
            &create,
            &request,
            &Identity::ethereum_address(PAYEE),
            2,
        )
        .unwrap();
    request
}

struct Harness {
    ledger: Arc<MockLedger>,
    config: ConversionFeeProxyConfig,
    next_tx: u64,
}

impl Harness {
    fn new() -> Self {
        Self {
            ledger: Arc::new(MockLedger::new()),
            config: ConversionFeeProxyConfig::for_testing(),
            next_tx: 0,
        }
    }

    fn detector(&self) -> ConversionFeeProxyDetector {
        ConversionFeeProxyDetector::new(self.ledger.clone(), self.config.clone())
    }

    /// Record a transfer of `cents` (plus `fee_cents`) to `to`.
    fn pay(&mut self, request: &Request, to: &str, cents: u64, fee_cents: u64, timespan: u64) {
        self.next_tx += 1;
        let block = 10 + self.next_tx;
        let proxy = self.config.deployment("private").unwrap().address;
        let reference = payment_reference(&request.request_id, SALT, to);
        self.ledger
            .push_conversion_payment(
                proxy,
                &reference,
                block,
                tx_hash(self.next_tx),
                ConversionTransfer {
                    amount: U256::from(cents) * U256::exp10(6),
                    currency: address(&eur().hash()),
                    fee_amount: U256::from(fee_cents) * U256::exp10(6),
                    max_rate_timespan: U256::from(timespan),
                },
                FeeProxyTransfer {
                    to: address(to),
                    amount: U256::from(cents) * U256::exp10(16),
                    fee_amount: U256::from(fee_cents) * U256::exp10(16),
                    fee_address: address(FEE_ADDRESS),
                },
            )
            .unwrap();
        self.ledger.set_block_timestamp(block, 1_000 * block);
    }
}

#[tokio::test]
async fn test_payments_minus_refunds() {
    let request = created_request();
    let mut harness = Harness::new();
    harness.pay(&request, PAYMENT_ADDRESS, 60_000, 100, 0);
    harness.pay(&request, PAYMENT_ADDRESS, 50_000, 100, 600);
    harness.pay(&request, REFUND_ADDRESS, 5_000, 0, 0);

    let balance = harness.detector().get_balance(&request).await;
    assert_eq!(balance.error, None);
    assert_eq!(balance.balance.as_deref(), Some("105000"));
    assert_eq!(balance.fee_balance.as_deref(), Some("200"));
    assert_eq!(
        balance.events.iter().map(|e| e.name).collect::<Vec<_>>(),
        vec![
            PaymentEventName::Payment,
            PaymentEventName::Payment,
            PaymentEventName::Refund
        ]
    );
    assert_eq!(balance.events[0].parameters.to, PAYMENT_ADDRESS);
}

#[tokio::test]
async fn test_rate_timespan_above_extension_ceiling_is_ignored() {
    let request = created_request();
    let mut harness = Harness::new();
    harness.pay(&request, PAYMENT_ADDRESS, 60_000, 0, 601);

    let balance = harness.detector().get_balance(&request).await;
    assert_eq!(balance.balance.as_deref(), Some("0"));
    assert!(balance.events.is_empty());
}

#[tokio::test]
async fn test_refunds_can_exceed_payments() {
    let request = created_request();
    let mut harness = Harness::new();
    harness.pay(&request, PAYMENT_ADDRESS, 100, 0, 0);
    harness.pay(&request, REFUND_ADDRESS, 300, 0, 0);

    let balance = harness.detector().get_balance(&request).await;
    assert_eq!(balance.balance.as_deref(), Some("-200"));
}

#[tokio::test]
async fn test_ledger_outage_is_reported() {
    let request = created_request();
    let mut harness = Harness::new();
    harness.pay(&request, PAYMENT_ADDRESS, 100, 0, 0);
    harness.ledger.fail_next(4);

    let balance = harness.detector().get_balance(&request).await;
    assert_eq!(balance.balance, None);
    assert_eq!(
        balance.error.map(|e| e.code),
        Some(BalanceErrorCode::Unknown)
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_balance_is_payments_minus_refunds(
        payments in prop::collection::vec(1u64..1_000_000, 0..5),
        refunds in prop::collection::vec(1u64..1_000_000, 0..5),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let request = created_request();
        let mut harness = Harness::new();
        for cents in &payments {
            harness.pay(&request, PAYMENT_ADDRESS, *cents, 0, 0);
        }
        for cents in &refunds {
            harness.pay(&request, REFUND_ADDRESS, *cents, 0, 0);
        }

        let balance = runtime.block_on(harness.detector().get_balance(&request));
        let expected = payments.iter().sum::<u64>() as i128 - refunds.iter().sum::<u64>() as i128;
        prop_assert_eq!(balance.balance, Some(expected.to_string()));
        prop_assert_eq!(balance.events.len(), payments.len() + refunds.len());
    }
}
