//! Injected signing and recovery capabilities.
//!
//! The engine never touches keys or wallets directly. Issuance takes a
//! [`TypedDataSigner`] and verification a [`TypedDataRecoverer`]; the
//! implementations here cover local keys, pre-signed attachments, and
//! arbitrary async closures (wallet round trips, remote KMS calls).

use std::future::Future;

use async_trait::async_trait;
use vess_crypto::{KeyPair, TypedData};

use crate::error::BoxError;

/// Produces an `eth_signTypedData_v4` signature (`0x` hex) over a digest.
#[async_trait]
pub trait TypedDataSigner: Send + Sync {
    async fn sign_typed_data(&self, data: &TypedData) -> Result<String, BoxError>;
}

/// Recovers the signer address of a `0x` hex signature over a digest.
#[async_trait]
pub trait TypedDataRecoverer: Send + Sync {
    async fn recover_typed_data(&self, data: &TypedData, signature: &str)
        -> Result<String, BoxError>;
}

/// Signs with an in-process secp256k1 key.
pub struct LocalSigner {
    keypair: KeyPair,
}

impl LocalSigner {
    pub fn new(keypair: KeyPair) -> Self {
        Self { keypair }
    }

    /// Checksummed address of the signing key.
    pub fn address(&self) -> String {
        self.keypair.address()
    }
}

#[async_trait]
impl TypedDataSigner for LocalSigner {
    async fn sign_typed_data(&self, data: &TypedData) -> Result<String, BoxError> {
        Ok(vess_crypto::sign_typed_data(data, &self.keypair)?.to_hex())
    }
}

/// Attaches a signature that was produced elsewhere.
#[derive(Debug, Clone)]
pub struct PresignedSigner {
    signature: String,
}

impl PresignedSigner {
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
        }
    }
}

#[async_trait]
impl TypedDataSigner for PresignedSigner {
    async fn sign_typed_data(&self, _data: &TypedData) -> Result<String, BoxError> {
        Ok(self.signature.clone())
    }
}

/// Signs through an async closure receiving the typed data.
pub struct FnSigner<F> {
    f: F,
}

impl<F, Fut> FnSigner<F>
where
    F: Fn(TypedData) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, BoxError>> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> TypedDataSigner for FnSigner<F>
where
    F: Fn(TypedData) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, BoxError>> + Send + 'static,
{
    async fn sign_typed_data(&self, data: &TypedData) -> Result<String, BoxError> {
        (self.f)(data.clone()).await
    }
}

/// Signs through an async closure receiving the serialized typed data, as
/// passed to `eth_signTypedData_v4` over JSON-RPC.
pub struct JsonStringSigner<F> {
    f: F,
}

impl<F, Fut> JsonStringSigner<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, BoxError>> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> TypedDataSigner for JsonStringSigner<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, BoxError>> + Send + 'static,
{
    async fn sign_typed_data(&self, data: &TypedData) -> Result<String, BoxError> {
        let json = data.to_json_string()?;
        (self.f)(json).await
    }
}

/// Recovers with secp256k1 public-key recovery.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Recoverer;

#[async_trait]
impl TypedDataRecoverer for Secp256k1Recoverer {
    async fn recover_typed_data(
        &self,
        data: &TypedData,
        signature: &str,
    ) -> Result<String, BoxError> {
        Ok(vess_crypto::recover_typed_data(data, signature)?)
    }
}

/// Recovers through an async closure.
pub struct FnRecoverer<F> {
    f: F,
}

impl<F, Fut> FnRecoverer<F>
where
    F: Fn(TypedData, String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, BoxError>> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> TypedDataRecoverer for FnRecoverer<F>
where
    F: Fn(TypedData, String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, BoxError>> + Send + 'static,
{
    async fn recover_typed_data(
        &self,
        data: &TypedData,
        signature: &str,
    ) -> Result<String, BoxError> {
        (self.f)(data.clone(), signature.to_string()).await
    }
}
