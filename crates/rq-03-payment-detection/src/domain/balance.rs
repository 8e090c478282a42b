//! # Balance Aggregation
//!
//! balance = Σ payments − Σ refunds, which may be negative.
//! fee balance = Σ fee amounts of the events paid to the extension's fee
//! address.

use primitive_types::U256;
use shared_types::{parse_amount, same_address};

use super::errors::PaymentDetectionError;
use super::events::PaymentEvent;

fn amount(value: &str) -> Result<U256, PaymentDetectionError> {
    parse_amount(value).ok_or_else(|| PaymentDetectionError::InvalidAmount(value.to_string()))
}

/// Sum of event amounts.
pub fn sum_amounts(events: &[PaymentEvent]) -> Result<U256, PaymentDetectionError> {
    events
        .iter()
        .try_fold(U256::zero(), |total, event| Ok(total.saturating_add(amount(&event.amount)?)))
}

/// `payments - refunds` in decimal, with a leading `-` when negative.
pub fn signed_balance(payments: &str, refunds: &str) -> Result<String, PaymentDetectionError> {
    let payments = amount(payments)?;
    let refunds = amount(refunds)?;
    Ok(if payments >= refunds {
        (payments - refunds).to_string()
    } else {
        format!("-{}", refunds - payments)
    })
}

/// Sum of the fee amounts of `events` paid to `fee_address`.
///
/// Events without a fee amount, or paid to another address, are skipped.
pub fn fee_balance<'a>(
    events: impl IntoIterator<Item = &'a PaymentEvent>,
    fee_address: Option<&str>,
) -> Result<U256, PaymentDetectionError> {
    let Some(fee_address) = fee_address else {
        return Ok(U256::zero());
    };
    events
        .into_iter()
        .filter(|event| {
            event
                .parameters
                .fee_address
                .as_deref()
                .map_or(false, |address| same_address(address, fee_address))
        })
        .filter_map(|event| event.parameters.fee_amount.as_deref())
        .try_fold(U256::zero(), |total, fee| Ok(total.saturating_add(amount(fee)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Hash, PaymentEventName, PaymentEventParameters};

    fn event(amount: &str, fee_address: Option<&str>, fee_amount: Option<&str>) -> PaymentEvent {
        PaymentEvent {
            amount: amount.into(),
            name: PaymentEventName::Payment,
            parameters: PaymentEventParameters {
                block: 1,
                tx_hash: Hash::zero(),
                to: "0xf17f52151ebef6c7334fad080c5704d77216b732".into(),
                fee_address: fee_address.map(String::from),
                fee_amount: fee_amount.map(String::from),
                amount_in_crypto: None,
                fee_amount_in_crypto: None,
                max_rate_timespan: None,
            },
            timestamp: 10,
        }
    }

    #[test]
    fn test_signed_balance() {
        assert_eq!(signed_balance("1000", "200").unwrap(), "800");
        assert_eq!(signed_balance("200", "1000").unwrap(), "-800");
        assert_eq!(signed_balance("0", "0").unwrap(), "0");
        assert!(signed_balance("-1", "0").is_err());
    }

    #[test]
    fn test_sum_amounts() {
        let events = vec![event("100", None, None), event("500", None, None)];
        assert_eq!(sum_amounts(&events).unwrap(), U256::from(600u64));
        assert_eq!(sum_amounts(&[]).unwrap(), U256::zero());
    }

    #[test]
    fn test_fee_balance_counts_matching_address_only() {
        let fee = "0xC5fdf4076b8F3A5357c5E395ab970B5B54098Fef";
        let lowercase = fee.to_lowercase();
        let events = vec![
            event("100", Some("fee address"), Some("5")),
            event("500", Some(lowercase.as_str()), Some("5")),
            event("500", Some(""), Some("0")),
            event("1", Some(fee), None),
        ];
        assert_eq!(fee_balance(&events, Some(fee)).unwrap(), U256::from(5u64));
        assert_eq!(fee_balance(&events, None).unwrap(), U256::zero());
    }
}
