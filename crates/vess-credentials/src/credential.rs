//! Credential envelope, proof, and the canonical credential builder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use vess_core::timestamp::{self, DEFAULT_VALIDITY_YEARS};
use vess_core::{is_ethereum_address, Did};
use vess_crypto::{Eip712Domain, TypeTable, TypedData};

use crate::error::CredentialError;
use crate::schema::CredentialKindDescriptor;

/// W3C verifiable credentials v1 context.
pub const DEFAULT_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// Ethereum EIP-712 Signature 2021 context.
pub const EIP712_CONTEXT: &str = "https://raw.githubusercontent.com/w3c-ccg/ethereum-eip712-signature-2021-spec/main/contexts/v1/index.json";

pub const DEFAULT_VC_TYPE: &str = "VerifiableCredential";
pub const SCHEMA_VALIDATOR_TYPE: &str = "Eip712SchemaValidator2021";
pub const PROOF_TYPE: &str = "EthereumEip712Signature2021";
pub const PROOF_PURPOSE: &str = "assertionMethod";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issuer {
    pub id: String,
    pub ethereum_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSchemaRef {
    pub id: String,
    #[serde(rename = "type")]
    pub schema_type: String,
}

/// The unsigned body of a verifiable credential.
///
/// Dates are kept as the exact strings that were signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialEnvelope<S> {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub id: String,
    pub issuer: Issuer,
    pub credential_subject: S,
    pub credential_schema: CredentialSchemaRef,
    pub issuance_date: String,
    pub expiration_date: String,
}

impl<S> CredentialEnvelope<S> {
    pub fn issuance_time(&self) -> Result<DateTime<Utc>, CredentialError> {
        Ok(timestamp::parse_iso8601(&self.issuance_date)?)
    }

    pub fn expiration_time(&self) -> Result<DateTime<Utc>, CredentialError> {
        Ok(timestamp::parse_iso8601(&self.expiration_date)?)
    }

    pub fn is_expired_at(&self, now: &DateTime<Utc>) -> Result<bool, CredentialError> {
        Ok(self.expiration_time()? <= *now)
    }
}

impl<S: Serialize> CredentialEnvelope<S> {
    /// The envelope with its subject erased to JSON.
    pub fn to_json_envelope(&self) -> Result<CredentialEnvelope<Value>, CredentialError> {
        Ok(CredentialEnvelope {
            context: self.context.clone(),
            types: self.types.clone(),
            id: self.id.clone(),
            issuer: self.issuer.clone(),
            credential_subject: serde_json::to_value(&self.credential_subject)?,
            credential_schema: self.credential_schema.clone(),
            issuance_date: self.issuance_date.clone(),
            expiration_date: self.expiration_date.clone(),
        })
    }
}

/// `domain`, `types` and `primaryType` of the digest that was signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Echo {
    pub domain: Eip712Domain,
    pub types: TypeTable,
    pub primary_type: String,
}

impl From<&TypedData> for Eip712Echo {
    fn from(data: &TypedData) -> Self {
        Self {
            domain: data.domain.clone(),
            types: data.types.clone(),
            primary_type: data.primary_type.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    pub verification_method: String,
    pub ethereum_address: String,
    pub created: String,
    pub proof_purpose: String,
    #[serde(rename = "type")]
    pub proof_type: String,
    pub proof_value: String,
    pub eip712: Eip712Echo,
}

impl Proof {
    /// Proof by `issuer` over `digest`, created at `created`.
    ///
    /// Fails if `issuer.id` is not a DID.
    pub fn new(
        issuer: &Issuer,
        created: &DateTime<Utc>,
        proof_value: String,
        digest: &TypedData,
    ) -> Result<Self, CredentialError> {
        let did = Did::parse(issuer.id.as_str())?;
        Ok(Self {
            verification_method: did.ethereum_verification_method(),
            ethereum_address: issuer.ethereum_address.clone(),
            created: timestamp::to_iso8601(created),
            proof_purpose: PROOF_PURPOSE.to_string(),
            proof_type: PROOF_TYPE.to_string(),
            proof_value,
            eip712: Eip712Echo::from(digest),
        })
    }
}

/// A signed credential: the envelope plus its proof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiableCredential<S> {
    #[serde(flatten)]
    pub envelope: CredentialEnvelope<S>,
    pub proof: Proof,
}

impl<S> std::ops::Deref for VerifiableCredential<S> {
    type Target = CredentialEnvelope<S>;

    fn deref(&self) -> &Self::Target {
        &self.envelope
    }
}

/// Builds a [`CredentialEnvelope`] from a subject and its kind.
pub struct CredentialBuilder<S> {
    address: String,
    id: String,
    descriptor: &'static CredentialKindDescriptor,
    subject: S,
    extra_contexts: Vec<String>,
    expiration: Option<DateTime<Utc>>,
}

impl<S> CredentialBuilder<S> {
    /// `address` is the issuer's `0x` address, or an issuer DID.
    pub fn new(
        address: impl Into<String>,
        id: impl Into<String>,
        descriptor: &'static CredentialKindDescriptor,
        subject: S,
    ) -> Self {
        Self {
            address: address.into(),
            id: id.into(),
            descriptor,
            subject,
            extra_contexts: Vec::new(),
            expiration: None,
        }
    }

    /// Append contexts after the two default ones.
    pub fn with_contexts<I, T>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.extra_contexts.extend(extra.into_iter().map(Into::into));
        self
    }

    /// Override the default 100-year expiration.
    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn with_expiration_opt(mut self, expiration: Option<DateTime<Utc>>) -> Self {
        self.expiration = expiration;
        self
    }

    pub fn build(self) -> Result<CredentialEnvelope<S>, CredentialError> {
        self.build_at(Utc::now())
    }

    /// Build with `now` as the issuance instant.
    pub fn build_at(self, now: DateTime<Utc>) -> Result<CredentialEnvelope<S>, CredentialError> {
        if self.id.trim().is_empty() {
            return Err(CredentialError::InvalidInput("credential id is empty".into()));
        }
        let (issuer_did, ethereum_address) = resolve_issuer(&self.address)?;

        let expiration = match self.expiration {
            Some(exp) => exp,
            None => timestamp::add_years(&now, DEFAULT_VALIDITY_YEARS)?,
        };
        // Compared at the millisecond precision the dates are stored with.
        if expiration.timestamp_millis() <= now.timestamp_millis() {
            return Err(CredentialError::InvalidInput(format!(
                "expiration {} is not after issuance {}",
                timestamp::to_iso8601(&expiration),
                timestamp::to_iso8601(&now)
            )));
        }

        let mut context = vec![DEFAULT_CONTEXT.to_string(), EIP712_CONTEXT.to_string()];
        context.extend(self.extra_contexts);

        Ok(CredentialEnvelope {
            context,
            types: vec![
                DEFAULT_VC_TYPE.to_string(),
                self.descriptor.vc_type.to_string(),
            ],
            id: self.id,
            issuer: Issuer {
                id: issuer_did.to_string(),
                ethereum_address,
            },
            credential_subject: self.subject,
            credential_schema: CredentialSchemaRef {
                id: self.descriptor.schema_uri.to_string(),
                schema_type: SCHEMA_VALIDATOR_TYPE.to_string(),
            },
            issuance_date: timestamp::to_iso8601(&now),
            expiration_date: timestamp::to_iso8601(&expiration),
        })
    }
}

/// Issuer DID and raw Ethereum address for an address or `did:pkh` input.
fn resolve_issuer(address: &str) -> Result<(Did, String), CredentialError> {
    if address.is_empty() {
        return Err(CredentialError::InvalidInput("issuer address is empty".into()));
    }
    let did = Did::from_address(address)?;
    if is_ethereum_address(address) {
        return Ok((did, address.to_string()));
    }
    let embedded = did.ethereum_address().map(str::to_string).ok_or_else(|| {
        CredentialError::InvalidInput(format!(
            "issuer DID {} does not carry an Ethereum address",
            did
        ))
    })?;
    Ok((did, embedded))
}
