//! VESS Crypto: Keccak-256, EIP-55 checksummed addresses, EIP-712 typed
//! structured data, and secp256k1 signing with public-key recovery.

pub mod address;
pub mod error;
pub mod hashing;
pub mod keys;
pub mod signing;
pub mod typed_data;

pub use address::{addresses_equal, to_checksum_address};
pub use error::CryptoError;
pub use hashing::{keccak256, Hash};
pub use keys::{KeyPair, PublicKey};
pub use signing::{
    recover_address, recover_public_key, recover_typed_data, sign_hash, sign_typed_data, Signature,
};
pub use typed_data::{
    base_type, is_atomic_type, Eip712Domain, TypeTable, TypedData, TypedDataField,
    EIP712_DOMAIN_TYPE_NAME,
};
