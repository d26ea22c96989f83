use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use vess_core::{is_ethereum_address, Did, Eip712Config};
use vess_crypto::{addresses_equal, TypedData};

use crate::credential::{CredentialEnvelope, Eip712Echo, Proof, VerifiableCredential};
use crate::digest::assemble_digest;
use crate::error::CredentialError;
use crate::schema::{describe, CredentialKind, CredentialKindDescriptor};
use crate::signer::{Secp256k1Recoverer, TypedDataRecoverer};

/// Result of a detailed credential inspection.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    /// Whether every check passed.
    pub valid: bool,
    /// Individual check results.
    pub checks: Vec<VerificationCheck>,
}

impl VerificationResult {
    pub fn check(&self, name: &str) -> Option<&VerificationCheck> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// An individual verification check.
#[derive(Debug, Clone)]
pub struct VerificationCheck {
    /// Stable snake_case identifier of the check.
    pub name: String,
    /// Whether the credential satisfied it.
    pub passed: bool,
    /// Why the check failed.
    pub detail: Option<String>,
}

impl VerificationCheck {
    fn new(name: &str, passed: bool, failure: impl FnOnce() -> String) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: if passed { None } else { Some(failure()) },
        }
    }
}

/// Verifies EIP-712 proofs on received credentials.
pub struct CredentialVerifier {
    recoverer: Arc<dyn TypedDataRecoverer>,
    config: Eip712Config,
}

impl Default for CredentialVerifier {
    fn default() -> Self {
        Self::new(Arc::new(Secp256k1Recoverer))
    }
}

impl CredentialVerifier {
    pub fn new(recoverer: Arc<dyn TypedDataRecoverer>) -> Self {
        Self {
            recoverer,
            config: Eip712Config::default(),
        }
    }

    pub fn with_config(mut self, config: Eip712Config) -> Self {
        self.config = config;
        self
    }

    /// Whether `credential.proof` was produced by `credential.issuer`.
    ///
    /// A signature that recovers to another address yields `Ok(false)`.
    /// Structural problems and recoverer failures are errors.
    pub async fn verify<S: Serialize + Sync>(
        &self,
        descriptor: &CredentialKindDescriptor,
        credential: &VerifiableCredential<S>,
    ) -> Result<bool, CredentialError> {
        let (_, matches) = self
            .recover_and_compare(descriptor, &credential.envelope, &credential.proof.proof_value)
            .await?;
        Ok(matches)
    }

    /// [`verify`](Self::verify) over raw credential JSON.
    pub async fn verify_json(
        &self,
        kind: CredentialKind,
        credential: &Value,
    ) -> Result<bool, CredentialError> {
        let (envelope, proof) = split_credential_json(credential)?;
        let (_, matches) = self
            .recover_and_compare(describe(kind), &envelope, &proof.proof_value)
            .await?;
        Ok(matches)
    }

    /// Run every check and report each one.
    pub async fn inspect<S: Serialize + Sync>(
        &self,
        descriptor: &CredentialKindDescriptor,
        credential: &VerifiableCredential<S>,
        now: DateTime<Utc>,
    ) -> Result<VerificationResult, CredentialError> {
        let envelope = &credential.envelope;
        let proof = &credential.proof;
        let mut checks = Vec::new();

        let (digest, signature_valid) = self
            .recover_and_compare(descriptor, envelope, &proof.proof_value)
            .await?;
        checks.push(VerificationCheck::new("signature_valid", signature_valid, || {
            format!(
                "signature does not recover to issuer {}",
                envelope.issuer.ethereum_address
            )
        }));

        let not_expired = match envelope.is_expired_at(&now) {
            Ok(expired) => !expired,
            Err(_) => false,
        };
        checks.push(VerificationCheck::new("not_expired", not_expired, || {
            format!("credential expired or unparsable: {}", envelope.expiration_date)
        }));

        let proof_address_matches =
            addresses_equal(&proof.ethereum_address, &envelope.issuer.ethereum_address)
                .unwrap_or(false);
        checks.push(VerificationCheck::new(
            "proof_address_matches_issuer",
            proof_address_matches,
            || format!("proof address {} is not the issuer's", proof.ethereum_address),
        ));

        let method_matches = Did::parse(envelope.issuer.id.as_str())
            .map(|did| did.ethereum_verification_method() == proof.verification_method)
            .unwrap_or(false);
        checks.push(VerificationCheck::new(
            "verification_method_matches_issuer",
            method_matches,
            || format!("unexpected verification method {}", proof.verification_method),
        ));

        let echo_matches = proof.eip712 == Eip712Echo::from(&digest);
        checks.push(VerificationCheck::new("eip712_echo_matches", echo_matches, || {
            "proof.eip712 differs from the reconstructed digest".into()
        }));

        let valid = checks.iter().all(|c| c.passed);
        tracing::debug!(
            credential_id = %envelope.id,
            valid,
            "credential inspected"
        );
        Ok(VerificationResult { valid, checks })
    }

    async fn recover_and_compare<S: Serialize + Sync>(
        &self,
        descriptor: &CredentialKindDescriptor,
        envelope: &CredentialEnvelope<S>,
        proof_value: &str,
    ) -> Result<(TypedData, bool), CredentialError> {
        let claimed = &envelope.issuer.ethereum_address;
        if !is_ethereum_address(claimed) {
            return Err(CredentialError::MalformedCredential(format!(
                "issuer.ethereumAddress is not an address: {:?}",
                claimed
            )));
        }
        if proof_value.is_empty() {
            return Err(CredentialError::MalformedCredential(
                "proof.proofValue is empty".into(),
            ));
        }

        let digest = assemble_digest(descriptor.domain, envelope, descriptor, &self.config)?;
        let recovered = self
            .recoverer
            .recover_typed_data(&digest, proof_value)
            .await
            .map_err(CredentialError::Recovery)?;
        let matches = addresses_equal(claimed, &recovered)
            .map_err(|e| CredentialError::Recovery(Box::new(e)))?;

        tracing::debug!(
            credential_id = %envelope.id,
            issuer = %claimed,
            matches,
            "credential signature checked"
        );
        Ok((digest, matches))
    }
}

/// Split raw credential JSON into its envelope and proof.
pub fn split_credential_json(
    credential: &Value,
) -> Result<(CredentialEnvelope<Value>, Proof), CredentialError> {
    let object = credential.as_object().ok_or_else(|| {
        CredentialError::MalformedCredential("credential is not a JSON object".into())
    })?;
    let proof = object
        .get("proof")
        .filter(|p| !p.is_null())
        .ok_or_else(|| CredentialError::MalformedCredential("missing proof".into()))?;
    let proof: Proof = serde_json::from_value(proof.clone())
        .map_err(|e| CredentialError::MalformedCredential(format!("invalid proof: {}", e)))?;

    let mut body = object.clone();
    body.remove("proof");
    let envelope: CredentialEnvelope<Value> = serde_json::from_value(Value::Object(body))
        .map_err(|e| CredentialError::MalformedCredential(format!("invalid envelope: {}", e)))?;
    Ok((envelope, proof))
}
