use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use vess_core::Eip712Config;
use vess_crypto::KeyPair;

use crate::credential::{CredentialBuilder, Proof, VerifiableCredential};
use crate::digest::assemble_digest;
use crate::error::CredentialError;
use crate::schema::{describe, CredentialKindDescriptor};
use crate::signer::{LocalSigner, TypedDataSigner};
use crate::subject::Subject;

/// Optional envelope parameters for one issuance.
#[derive(Debug, Clone, Default)]
pub struct IssueOptions {
    /// Contexts appended after the two defaults.
    pub extra_contexts: Vec<String>,
    /// Expiration override; defaults to issuance + 100 years.
    pub expiration: Option<DateTime<Utc>>,
}

/// Issues EIP-712 signed verifiable credentials through an injected signer.
pub struct CredentialIssuer {
    /// Issuer address (or `did:pkh` DID).
    address: String,
    signer: Arc<dyn TypedDataSigner>,
    config: Eip712Config,
}

impl CredentialIssuer {
    /// Issuer that signs as `address` (a `0x` address or `did:pkh` DID)
    /// through `signer`, with the default EIP-712 configuration.
    pub fn new(address: impl Into<String>, signer: Arc<dyn TypedDataSigner>) -> Self {
        Self {
            address: address.into(),
            signer,
            config: Eip712Config::default(),
        }
    }

    /// Issuer backed by a local key; the address is the key's.
    pub fn from_keypair(keypair: KeyPair) -> Self {
        let signer = LocalSigner::new(keypair);
        let address = signer.address();
        Self::new(address, Arc::new(signer))
    }

    /// Replace the EIP-712 configuration used for every digest.
    pub fn with_config(mut self, config: Eip712Config) -> Self {
        self.config = config;
        self
    }

    /// The issuer identity as given at construction.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The EIP-712 configuration in use.
    pub fn config(&self) -> &Eip712Config {
        &self.config
    }

    /// Build, sign and attach a proof to a credential of the given kind.
    pub async fn issue<S: Serialize + Send + Sync>(
        &self,
        descriptor: &'static CredentialKindDescriptor,
        id: impl Into<String>,
        subject: S,
        options: &IssueOptions,
    ) -> Result<VerifiableCredential<S>, CredentialError> {
        self.issue_at(Utc::now(), descriptor, id, subject, options)
            .await
    }

    /// [`issue`](Self::issue) with an explicit issuance instant. `now` is
    /// used for `issuanceDate`, the default expiration and `proof.created`.
    pub async fn issue_at<S: Serialize + Send + Sync>(
        &self,
        now: DateTime<Utc>,
        descriptor: &'static CredentialKindDescriptor,
        id: impl Into<String>,
        subject: S,
        options: &IssueOptions,
    ) -> Result<VerifiableCredential<S>, CredentialError> {
        let envelope = CredentialBuilder::new(self.address.clone(), id, descriptor, subject)
            .with_contexts(options.extra_contexts.iter().cloned())
            .with_expiration_opt(options.expiration)
            .build_at(now)?;

        let digest = assemble_digest(descriptor.domain, &envelope, descriptor, &self.config)?;

        let proof_value = self
            .signer
            .sign_typed_data(&digest)
            .await
            .map_err(CredentialError::Signing)?;

        let proof = Proof::new(&envelope.issuer, &now, proof_value, &digest)?;

        tracing::info!(
            issuer = %envelope.issuer.id,
            credential_id = %envelope.id,
            kind = %descriptor.kind,
            "credential issued"
        );

        Ok(VerifiableCredential { envelope, proof })
    }

    /// Issue for a typed subject using its kind and conventional id.
    pub async fn issue_subject<S: Subject>(
        &self,
        subject: S,
        options: &IssueOptions,
    ) -> Result<VerifiableCredential<S>, CredentialError> {
        self.issue_subject_at(Utc::now(), subject, options).await
    }

    pub async fn issue_subject_at<S: Subject>(
        &self,
        now: DateTime<Utc>,
        subject: S,
        options: &IssueOptions,
    ) -> Result<VerifiableCredential<S>, CredentialError> {
        let id = subject.credential_id();
        self.issue_at(now, describe(S::KIND), id, subject, options)
            .await
    }

    /// Issue one credential per subject, signing concurrently.
    ///
    /// All-or-nothing: the first failure is returned and no credentials are.
    /// Every credential shares the same issuance instant.
    pub async fn issue_batch<S: Subject>(
        &self,
        subjects: Vec<S>,
        options: &IssueOptions,
    ) -> Result<Vec<VerifiableCredential<S>>, CredentialError> {
        let now = Utc::now();
        let count = subjects.len();
        let issued = futures::future::try_join_all(
            subjects
                .into_iter()
                .map(|subject| self.issue_subject_at(now, subject, options)),
        )
        .await?;

        tracing::info!(
            issuer = %self.address,
            kind = %S::KIND,
            count,
            "credential batch issued"
        );
        Ok(issued)
    }
}
