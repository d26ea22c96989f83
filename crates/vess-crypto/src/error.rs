/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("public key recovery failed: {0}")]
    RecoveryFailed(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unknown type `{0}`: not an atomic type and not declared in the type table")]
    UnknownType(String),

    #[error("missing value for field `{field}` of type `{type_name}`")]
    MissingValue { field: String, type_name: String },

    #[error("invalid value for type `{type_name}`: {reason}")]
    InvalidValue { type_name: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
