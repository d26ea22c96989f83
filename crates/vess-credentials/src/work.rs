//! Holder-signed work credentials.
//!
//! Unlike the W3C credentials, a work credential is signed by its holder
//! over the work subject alone (EIP-712 primary type
//! `WorkCredentialSubject`, domain `Work Credential`). Partners may later
//! countersign the same subject.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vess_core::timestamp::to_unix_seconds_string;
use vess_core::Eip712Config;
use vess_crypto::{addresses_equal, TypeTable, TypedData};

use crate::digest::domain_for;
use crate::error::CredentialError;
use crate::schema::{
    to_fields, EIP712_DOMAIN_TYPE, WORK_CREDENTIAL_SUBJECT_TYPE, WORK_NESTED_TYPES,
};
use crate::signer::{TypedDataRecoverer, TypedDataSigner};
use crate::subject::{Client, DeliverableItem, Transaction, Work};

pub const WORK_DOMAIN_NAME: &str = "Work Credential";
pub const WORK_SUBJECT_PRIMARY_TYPE: &str = "WorkCredentialSubject";

/// The subject a holder signs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCredentialSubject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<Work>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx: Option<Transaction>,
    #[serde(default)]
    pub deliverables: Vec<DeliverableItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<Client>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signatures {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder_sig: Option<String>,
    /// DID of the countersigning partner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_signer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_sig: Option<String>,
    /// DID of the agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_signer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_sig: Option<String>,
}

/// A work credential. Timestamps are unix seconds as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkCredential {
    pub id: String,
    pub subject: WorkCredentialSubject,
    pub signature: Signatures,
    pub created_at: String,
    pub updated_at: String,
}

/// Typed data the holder signs for `subject`.
pub fn work_subject_typed_data(
    subject: &WorkCredentialSubject,
    config: &Eip712Config,
) -> Result<TypedData, CredentialError> {
    let mut types = TypeTable::new()
        .with("EIP712Domain", to_fields(EIP712_DOMAIN_TYPE))
        .with(WORK_SUBJECT_PRIMARY_TYPE, to_fields(WORK_CREDENTIAL_SUBJECT_TYPE));
    for (name, fields) in WORK_NESTED_TYPES {
        types.insert(*name, to_fields(fields));
    }
    let data = TypedData {
        domain: domain_for(WORK_DOMAIN_NAME, config),
        primary_type: WORK_SUBJECT_PRIMARY_TYPE.to_string(),
        message: serde_json::to_value(subject)?,
        types,
    };
    data.signing_hash()?;
    Ok(data)
}

async fn sign_subject(
    subject: &WorkCredentialSubject,
    signer: &dyn TypedDataSigner,
    config: &Eip712Config,
) -> Result<String, CredentialError> {
    let data = work_subject_typed_data(subject, config)?;
    signer
        .sign_typed_data(&data)
        .await
        .map_err(CredentialError::Signing)
}

/// Create a work credential signed by its holder.
pub async fn create_work_credential(
    id: impl Into<String>,
    subject: WorkCredentialSubject,
    signer: &dyn TypedDataSigner,
    config: &Eip712Config,
) -> Result<WorkCredential, CredentialError> {
    create_work_credential_at(Utc::now(), id, subject, signer, config).await
}

pub async fn create_work_credential_at(
    now: DateTime<Utc>,
    id: impl Into<String>,
    subject: WorkCredentialSubject,
    signer: &dyn TypedDataSigner,
    config: &Eip712Config,
) -> Result<WorkCredential, CredentialError> {
    let id = id.into();
    if id.trim().is_empty() {
        return Err(CredentialError::InvalidInput("credential id is empty".into()));
    }
    let holder_sig = sign_subject(&subject, signer, config).await?;
    let timestamp = to_unix_seconds_string(&now);

    tracing::info!(credential_id = %id, "work credential created");
    Ok(WorkCredential {
        id,
        subject,
        signature: Signatures {
            holder_sig: Some(holder_sig),
            ..Default::default()
        },
        created_at: timestamp.clone(),
        updated_at: timestamp,
    })
}

/// Add a partner countersignature over the same subject.
///
/// Existing signatures are kept; `updatedAt` moves to `now`.
pub async fn countersign_work_credential(
    credential: &WorkCredential,
    partner: impl Into<String>,
    signer: &dyn TypedDataSigner,
    config: &Eip712Config,
    now: DateTime<Utc>,
) -> Result<WorkCredential, CredentialError> {
    let partner_sig = sign_subject(&credential.subject, signer, config).await?;
    let partner = partner.into();

    tracing::info!(credential_id = %credential.id, partner = %partner, "work credential countersigned");
    Ok(WorkCredential {
        signature: Signatures {
            partner_signer: Some(partner),
            partner_sig: Some(partner_sig),
            ..credential.signature.clone()
        },
        updated_at: to_unix_seconds_string(&now),
        ..credential.clone()
    })
}

/// Whether `signature` over the credential's subject was made by `expected`.
pub async fn verify_work_signature(
    credential: &WorkCredential,
    signature: &str,
    expected: &str,
    recoverer: &dyn TypedDataRecoverer,
    config: &Eip712Config,
) -> Result<bool, CredentialError> {
    if !vess_core::is_ethereum_address(expected) {
        return Err(CredentialError::InvalidInput(format!(
            "expected signer is not an address: {:?}",
            expected
        )));
    }
    let data = work_subject_typed_data(&credential.subject, config)?;
    let recovered = recoverer
        .recover_typed_data(&data, signature)
        .await
        .map_err(CredentialError::Recovery)?;
    addresses_equal(expected, &recovered).map_err(|e| CredentialError::Recovery(Box::new(e)))
}

/// Whether the holder signature was made by `holder`.
pub async fn verify_holder_signature(
    credential: &WorkCredential,
    holder: &str,
    recoverer: &dyn TypedDataRecoverer,
    config: &Eip712Config,
) -> Result<bool, CredentialError> {
    let signature = credential
        .signature
        .holder_sig
        .as_deref()
        .ok_or_else(|| CredentialError::MalformedCredential("missing holderSig".into()))?;
    verify_work_signature(credential, signature, holder, recoverer, config).await
}
