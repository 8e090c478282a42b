//! # Formats
//!
//! Well-formedness checks and constructors for the string formats that cross
//! subsystem boundaries:
//!
//! - **Multi-format keccak-256 hash**: `"01"` prefix + 64 lowercase hex chars.
//!   Used for channel ids and topics.
//! - **Ethereum address**: `0x` + 40 hex chars, EIP-55 checksum enforced when
//!   the address is mixed-case.
//! - **Amount**: a non-negative base-10 integer that fits in 256 bits.

use primitive_types::U256;
use sha3::{Digest, Keccak256};

/// Multi-format prefix identifying a keccak-256 hash.
pub const KECCAK256_PREFIX: &str = "01";

/// Length of a multi-format keccak-256 hash string (prefix + 32 bytes hex).
pub const KECCAK256_MULTIFORMAT_LEN: usize = 2 + 64;

/// Raw keccak-256 digest.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Keccak-256 digest of `data`, in multi-format string form.
pub fn keccak256_multiformat(data: &[u8]) -> String {
    format!("{}{}", KECCAK256_PREFIX, hex::encode(keccak256(data)))
}

/// Returns true if `value` is a well-formed multi-format keccak-256 hash.
pub fn is_keccak256_multiformat(value: &str) -> bool {
    value.len() == KECCAK256_MULTIFORMAT_LEN
        && value.starts_with(KECCAK256_PREFIX)
        && value[KECCAK256_PREFIX.len()..]
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Returns true if `value` is a valid Ethereum address.
///
/// All-lowercase and all-uppercase addresses are accepted as is. Mixed-case
/// addresses must carry a correct EIP-55 checksum.
pub fn is_valid_eth_address(value: &str) -> bool {
    let Some(body) = value.strip_prefix("0x") else {
        return false;
    };
    if body.len() != 40 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }

    let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return true;
    }

    to_checksum_address(value).as_deref() == Some(value)
}

/// EIP-55 checksummed form of an address, or `None` if it is not 20 hex bytes.
pub fn to_checksum_address(value: &str) -> Option<String> {
    let body = value.strip_prefix("0x")?;
    if body.len() != 40 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let lower = body.to_ascii_lowercase();
    let digest = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = (digest[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    Some(out)
}

/// Case-insensitive address comparison.
pub fn same_address(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Parse an amount string into a `U256`.
///
/// Only plain base-10 digits are accepted: no sign, no decimals, no
/// exponent, no whitespace.
pub fn parse_amount(value: &str) -> Option<U256> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    U256::from_dec_str(value).ok()
}

/// Returns true if `value` is a valid non-negative integer amount.
pub fn is_valid_amount(value: &str) -> bool {
    parse_amount(value).is_some()
}
