//! Ethereum addresses and EIP-55 checksum normalization

use k256::ecdsa::VerifyingKey;

use crate::error::{CryptoError, Result};
use crate::hash::keccak256;

/// Parse a `0x`-prefixed 20 byte hex address in any letter case
pub fn parse_address(address: &str) -> Result<[u8; 20]> {
    let stripped = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| CryptoError::InvalidAddress(format!("missing 0x prefix: {}", address)))?;

    let bytes = hex::decode(stripped)
        .map_err(|e| CryptoError::InvalidAddress(format!("{}: {}", address, e)))?;

    bytes
        .try_into()
        .map_err(|_| CryptoError::InvalidAddress(format!("expected 20 bytes: {}", address)))
}

/// EIP-55 mixed-case encoding of an address
pub fn checksum_encode(address: &[u8; 20]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut encoded = String::with_capacity(42);
    encoded.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            encoded.push(c.to_ascii_uppercase());
        } else {
            encoded.push(c);
        }
    }
    encoded
}

/// Normalize an address string to its EIP-55 form
pub fn to_checksum_address(address: &str) -> Result<String> {
    parse_address(address).map(|bytes| checksum_encode(&bytes))
}

/// Whether two address strings denote the same account. Malformed input
/// never matches.
pub fn addresses_equal(a: &str, b: &str) -> bool {
    match (parse_address(a), parse_address(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Address controlled by a secp256k1 public key
pub fn address_of(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    checksum_encode(&address)
}
