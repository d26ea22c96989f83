use vess_core::CoreError;
use vess_crypto::CryptoError;

/// Error type returned by injected signing and recovery callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Credential engine errors.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("unknown credential kind: {0}")]
    UnknownCredentialKind(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("incomplete type table: `{0}` is referenced but not declared")]
    IncompleteTypes(String),

    #[error("malformed credential: {0}")]
    MalformedCredential(String),

    /// The injected signer failed. The source is the callback's own error.
    #[error("signing failed: {0}")]
    Signing(#[source] BoxError),

    /// The injected recoverer failed. The source is the callback's own error.
    #[error("signature recovery failed: {0}")]
    Recovery(#[source] BoxError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("crypto error: {0}")]
    Crypto(CryptoError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<CryptoError> for CredentialError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::UnknownType(name) => CredentialError::IncompleteTypes(name),
            other => CredentialError::Crypto(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_maps_to_incomplete_types() {
        let err: CredentialError = CryptoError::UnknownType("TX".into()).into();
        assert!(matches!(err, CredentialError::IncompleteTypes(name) if name == "TX"));
    }

    #[test]
    fn test_signing_error_keeps_source() {
        let source: BoxError = "wallet rejected the request".into();
        let err = CredentialError::Signing(source);
        let inner = std::error::Error::source(&err).unwrap();
        assert_eq!(inner.to_string(), "wallet rejected the request");
    }
}
