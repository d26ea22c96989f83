//! Shared fixtures for the cross-crate tests under `tests/`.

use chrono::{DateTime, TimeZone, Utc};
use vess_crypto::KeyPair;

/// Private key of `keccak256("cow")`, the signer of the canonical "Mail" example.
pub const COW_KEY: &str = "c85ef7d79691fe79573b1a7064c19c1a9819ebdbd1faaab1a8ec92344438aaf4";

/// Checksummed address of [`COW_KEY`].
pub const COW_ADDRESS: &str = "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826";

pub const HOLDER_DID: &str = "did:pkh:eip155:1:0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

pub fn cow_keypair() -> KeyPair {
    match KeyPair::from_hex(COW_KEY) {
        Ok(kp) => kp,
        Err(e) => panic!("fixture key is valid: {e}"),
    }
}

/// 2024-05-01T12:00:00Z.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.timestamp_opt(1_714_564_800, 0)
        .single()
        .unwrap_or_else(|| panic!("fixture instant is unambiguous"))
}
