//! Structured-data digest assembly.
//!
//! Turns a credential envelope into the exact EIP-712 payload that is
//! signed, and that a verifier rebuilds independently. The type table is
//! always laid out as `EIP712Domain`, `VerifiableCredential`,
//! `CredentialSchema`, `Issuer`, `CredentialSubject`, then the subject's
//! nested composite types in depth-first order of first reference.

use serde::Serialize;

use vess_core::Eip712Config;
use vess_crypto::{base_type, is_atomic_type, Eip712Domain, TypeTable, TypedData};

use crate::credential::CredentialEnvelope;
use crate::error::CredentialError;
use crate::schema::{
    to_fields, CredentialKindDescriptor, FieldDef, CREDENTIAL_SCHEMA_TYPE, EIP712_DOMAIN_TYPE,
    ISSUER_TYPE, VERIFIABLE_CREDENTIAL_TYPE,
};

/// Root type of every credential digest.
pub const VERIFIABLE_CREDENTIAL_PRIMARY_TYPE: &str = "VerifiableCredential";

/// Name under which the kind's subject fields are declared.
pub const CREDENTIAL_SUBJECT_TYPE_NAME: &str = "CredentialSubject";

/// The EIP-712 domain for `name` under the configured chain parameters.
pub fn domain_for(name: &str, config: &Eip712Config) -> Eip712Domain {
    Eip712Domain {
        name: name.to_string(),
        version: config.version.clone(),
        chain_id: config.chain_id,
        verifying_contract: config.verifying_contract.clone(),
    }
}

/// The complete type table for a credential of this kind.
pub fn credential_type_table(
    descriptor: &CredentialKindDescriptor,
) -> Result<TypeTable, CredentialError> {
    let mut types = TypeTable::new()
        .with("EIP712Domain", to_fields(EIP712_DOMAIN_TYPE))
        .with(
            VERIFIABLE_CREDENTIAL_PRIMARY_TYPE,
            to_fields(VERIFIABLE_CREDENTIAL_TYPE),
        )
        .with("CredentialSchema", to_fields(CREDENTIAL_SCHEMA_TYPE))
        .with("Issuer", to_fields(ISSUER_TYPE))
        .with(
            CREDENTIAL_SUBJECT_TYPE_NAME,
            to_fields(descriptor.subject_fields),
        );
    add_nested_types(&mut types, descriptor, descriptor.subject_fields)?;
    Ok(types)
}

/// Declare every composite type reachable from `fields`, depth first.
pub(crate) fn add_nested_types(
    types: &mut TypeTable,
    descriptor: &CredentialKindDescriptor,
    fields: &[FieldDef],
) -> Result<(), CredentialError> {
    for field in fields {
        let name = base_type(field.type_name);
        if is_atomic_type(name) || types.contains(name) {
            continue;
        }
        let nested = descriptor
            .nested_type(name)
            .ok_or_else(|| CredentialError::IncompleteTypes(name.to_string()))?;
        types.insert(name, to_fields(nested));
        add_nested_types(types, descriptor, nested)?;
    }
    Ok(())
}

/// Assemble the signable digest for `envelope` under `domain_name`.
///
/// Fails if the type table is not closed, or if the envelope cannot be
/// encoded against it (for example a declared text member is missing from
/// the subject). Nothing is handed to a signer in either case.
pub fn assemble_digest<S: Serialize>(
    domain_name: &str,
    envelope: &CredentialEnvelope<S>,
    descriptor: &CredentialKindDescriptor,
    config: &Eip712Config,
) -> Result<TypedData, CredentialError> {
    let digest = TypedData {
        domain: domain_for(domain_name, config),
        primary_type: VERIFIABLE_CREDENTIAL_PRIMARY_TYPE.to_string(),
        message: serde_json::to_value(envelope)?,
        types: credential_type_table(descriptor)?,
    };
    digest.signing_hash()?;

    tracing::debug!(
        domain = domain_name,
        credential_id = %envelope.id,
        types = digest.types.len(),
        "credential digest assembled"
    );
    Ok(digest)
}

/// [`assemble_digest`] under the descriptor's own domain name.
pub fn digest_for<S: Serialize>(
    descriptor: &CredentialKindDescriptor,
    envelope: &CredentialEnvelope<S>,
    config: &Eip712Config,
) -> Result<TypedData, CredentialError> {
    assemble_digest(descriptor.domain, envelope, descriptor, config)
}
