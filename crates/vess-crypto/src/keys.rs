use secp256k1::{SecretKey, SECP256K1};
use zeroize::Zeroize;

use crate::address::address_from_digest_tail;
use crate::error::CryptoError;
use crate::hashing::keccak256;

/// secp256k1 key pair of an Ethereum account.
/// Private key material is erased on drop.
pub struct KeyPair {
    secret_key: SecretKey,
}

impl KeyPair {
    /// Generate a new random key pair from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let secret_key = SecretKey::new(&mut secp256k1::rand::thread_rng());
        Self { secret_key }
    }

    /// Create a key pair from a 32-byte secret scalar.
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, CryptoError> {
        let secret_key = SecretKey::from_slice(seed)
            .map_err(|e| CryptoError::InvalidKey(format!("invalid secret key: {}", e)))?;
        Ok(Self { secret_key })
    }

    /// Create a key pair from raw bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(bytes);
        let kp = Self::from_seed(&seed);
        seed.zeroize();
        kp
    }

    /// Decode a hex private key, with or without `0x`.
    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let trimmed = hex_str.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let mut bytes = hex::decode(digits)
            .map_err(|e| CryptoError::InvalidKey(format!("invalid hex: {}", e)))?;
        let kp = Self::from_bytes(&bytes);
        bytes.zeroize();
        kp
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            inner: self.secret_key.public_key(SECP256K1),
        }
    }

    /// EIP-55 checksummed address of this key.
    pub fn address(&self) -> String {
        self.public_key().address()
    }

    /// Raw private key bytes (32 bytes).
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret_key.secret_bytes()
    }

    /// Private key as `0x`-prefixed hex.
    pub fn secret_hex(&self) -> String {
        let mut bytes = self.secret_bytes();
        let out = format!("0x{}", hex::encode(bytes));
        bytes.zeroize();
        out
    }

    pub(crate) fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.secret_key.non_secure_erase();
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// secp256k1 public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    inner: secp256k1::PublicKey,
}

impl PublicKey {
    /// Parse a 33-byte compressed or 65-byte uncompressed SEC1 encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let inner = secp256k1::PublicKey::from_slice(bytes)
            .map_err(|e| CryptoError::InvalidKey(format!("invalid public key: {}", e)))?;
        Ok(Self { inner })
    }

    /// 65-byte uncompressed SEC1 encoding (`0x04 ‖ x ‖ y`).
    pub fn to_uncompressed(&self) -> [u8; 65] {
        self.inner.serialize_uncompressed()
    }

    /// Ethereum address: the last 20 bytes of `keccak256(x ‖ y)`.
    pub fn address(&self) -> String {
        let uncompressed = self.inner.serialize_uncompressed();
        address_from_digest_tail(&keccak256(&uncompressed[1..]))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_uncompressed()))
    }
}

impl From<secp256k1::PublicKey> for PublicKey {
    fn from(inner: secp256k1::PublicKey) -> Self {
        Self { inner }
    }
}
