//! EIP-55 mixed-case checksummed Ethereum addresses.

use crate::error::CryptoError;
use crate::hashing::keccak256;

/// Convert an address in any case to its EIP-55 checksummed form.
///
/// Input must be `0x` followed by exactly 40 hex digits. The checksum of
/// mixed-case input is not validated; the address is simply re-cased.
pub fn to_checksum_address(address: &str) -> Result<String, CryptoError> {
    let hex_part = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| CryptoError::InvalidAddress(format!("missing 0x prefix: {}", address)))?;
    if hex_part.len() != 40 || !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CryptoError::InvalidAddress(format!(
            "expected 40 hex digits, got: {}",
            address
        )));
    }

    let lower = hex_part.to_ascii_lowercase();
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
    Ok(out)
}

/// Compare two addresses after checksum normalization.
pub fn addresses_equal(a: &str, b: &str) -> Result<bool, CryptoError> {
    Ok(to_checksum_address(a)? == to_checksum_address(b)?)
}

/// Checksummed address for the last 20 bytes of a 32-byte Keccak digest.
pub(crate) fn address_from_digest_tail(digest: &[u8; 32]) -> String {
    let lower = format!("0x{}", hex::encode(&digest[12..]));
    // 40 lower-case hex digits always satisfy the checksum input contract.
    to_checksum_address(&lower).unwrap_or(lower)
}
