use sha3::{Digest, Keccak256};

/// Keccak-256 hash (32 bytes).
pub type Hash = [u8; 32];

/// Hash arbitrary data using Keccak-256 (the pre-standard SHA-3 padding
/// Ethereum uses).
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}
