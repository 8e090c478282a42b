//! # Payment Reference
//!
//! Short identifier tying on-chain transfers to one request and one
//! destination address. Derived from secrets of the request (its salt) so
//! third parties cannot link transfers to requests.

use shared_types::keccak256;

use super::errors::PaymentDetectionError;
use super::log::Hash;

/// Length in bytes of a payment reference.
pub const PAYMENT_REFERENCE_BYTES: usize = 8;

/// Last 8 bytes of keccak256(lowercase(request_id + salt + address)), as
/// 16 hex characters.
pub fn payment_reference(request_id: &str, salt: &str, address: &str) -> String {
    let preimage = format!("{}{}{}", request_id, salt, address).to_lowercase();
    let digest = keccak256(preimage.as_bytes());
    hex::encode(&digest[digest.len() - PAYMENT_REFERENCE_BYTES..])
}

/// Log topic of an indexed payment reference: keccak256 of its bytes.
pub fn payment_reference_topic(reference: &str) -> Result<Hash, PaymentDetectionError> {
    let bytes = hex::decode(reference.trim_start_matches("0x"))
        .map_err(|_| PaymentDetectionError::InvalidPaymentReference(reference.to_string()))?;
    Ok(Hash::from(keccak256(&bytes)))
}
