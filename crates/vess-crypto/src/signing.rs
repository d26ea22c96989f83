use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, SECP256K1};

use crate::address::to_checksum_address;
use crate::error::CryptoError;
use crate::hashing::Hash;
use crate::keys::{KeyPair, PublicKey};
use crate::typed_data::TypedData;

/// Recoverable ECDSA signature in Ethereum layout: `r ‖ s ‖ v`, 65 bytes,
/// with `v` in `{27, 28}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; 65]);

impl Signature {
    /// Create from raw bytes (65 bytes). A recovery byte of 0 or 1 is
    /// normalized to 27 or 28.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 65] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidSignature(format!(
                "signature must be 65 bytes, got {}",
                bytes.len()
            ))
        })?;
        let mut sig = Self(arr);
        sig.0[64] = match sig.0[64] {
            0 | 27 => 27,
            1 | 28 => 28,
            v => {
                return Err(CryptoError::InvalidSignature(format!(
                    "unsupported recovery byte: {}",
                    v
                )))
            }
        };
        Ok(sig)
    }

    /// Decode a `0x`-prefixed hex signature.
    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let digits = hex_str
            .strip_prefix("0x")
            .ok_or_else(|| CryptoError::InvalidSignature("missing 0x prefix".into()))?;
        let bytes = hex::decode(digits)
            .map_err(|e| CryptoError::InvalidSignature(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_bytes(&self) -> [u8; 65] {
        self.0
    }

    /// `0x`-prefixed lower-case hex, as carried in `proofValue`.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn r(&self) -> &[u8] {
        &self.0[..32]
    }

    pub fn s(&self) -> &[u8] {
        &self.0[32..64]
    }

    pub fn v(&self) -> u8 {
        self.0[64]
    }

    fn to_recoverable(self) -> Result<RecoverableSignature, CryptoError> {
        let recovery_id = RecoveryId::from_i32(i32::from(self.0[64] - 27))
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
        RecoverableSignature::from_compact(&self.0[..64], recovery_id)
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Sign a 32-byte digest. Deterministic (RFC 6979).
pub fn sign_hash(hash: &Hash, keypair: &KeyPair) -> Signature {
    let message = Message::from_digest(*hash);
    let (recovery_id, compact) = SECP256K1
        .sign_ecdsa_recoverable(&message, keypair.secret_key())
        .serialize_compact();
    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&compact);
    out[64] = 27 + recovery_id.to_i32() as u8;
    Signature(out)
}

/// Recover the signer's public key from a digest and signature.
pub fn recover_public_key(hash: &Hash, signature: &Signature) -> Result<PublicKey, CryptoError> {
    let message = Message::from_digest(*hash);
    let recoverable = signature.to_recoverable()?;
    SECP256K1
        .recover_ecdsa(&message, &recoverable)
        .map(PublicKey::from)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))
}

/// Recover the signer's checksummed address from a digest and signature.
pub fn recover_address(hash: &Hash, signature: &Signature) -> Result<String, CryptoError> {
    recover_public_key(hash, signature).map(|pk| pk.address())
}

/// `eth_signTypedData_v4`: sign the EIP-712 signing hash of `data`.
pub fn sign_typed_data(data: &TypedData, keypair: &KeyPair) -> Result<Signature, CryptoError> {
    let hash = data.signing_hash()?;
    let signature = sign_hash(&hash, keypair);
    tracing::debug!(
        primary_type = %data.primary_type,
        domain = %data.domain.name,
        signer = %keypair.address(),
        "typed data signed"
    );
    Ok(signature)
}

/// Recover the address that produced a `0x`-hex signature over `data`.
pub fn recover_typed_data(data: &TypedData, signature_hex: &str) -> Result<String, CryptoError> {
    let signature = Signature::from_hex(signature_hex)?;
    let hash = data.signing_hash()?;
    let address = recover_address(&hash, &signature)?;
    to_checksum_address(&address)
}
