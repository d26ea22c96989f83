//! Typed-data schema registry.
//!
//! Static tables describing, per credential kind, the EIP-712 shape of its
//! subject plus the domain name and schema URI used for domain separation.
//! Field order inside each table is hashed into `encodeType`; never reorder.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vess_crypto::TypedDataField;

use crate::error::CredentialError;

/// One `{name, type}` member of a static type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub type_name: &'static str,
}

impl FieldDef {
    pub const fn new(name: &'static str, type_name: &'static str) -> Self {
        Self { name, type_name }
    }
}

impl From<&FieldDef> for TypedDataField {
    fn from(field: &FieldDef) -> Self {
        TypedDataField::new(field.name, field.type_name)
    }
}

/// Convert a static table into owned typed-data fields.
pub fn to_fields(table: &[FieldDef]) -> Vec<TypedDataField> {
    table.iter().map(TypedDataField::from).collect()
}

pub const EIP712_DOMAIN_TYPE: &[FieldDef] = &[
    FieldDef::new("name", "string"),
    FieldDef::new("version", "string"),
    FieldDef::new("chainId", "uint256"),
    FieldDef::new("verifyingContract", "address"),
];

pub const VERIFIABLE_CREDENTIAL_TYPE: &[FieldDef] = &[
    FieldDef::new("@context", "string[]"),
    FieldDef::new("type", "string[]"),
    FieldDef::new("id", "string"),
    FieldDef::new("issuer", "Issuer"),
    FieldDef::new("credentialSubject", "CredentialSubject"),
    FieldDef::new("credentialSchema", "CredentialSchema"),
    FieldDef::new("issuanceDate", "string"),
    FieldDef::new("expirationDate", "string"),
];

pub const CREDENTIAL_SCHEMA_TYPE: &[FieldDef] = &[
    FieldDef::new("id", "string"),
    FieldDef::new("type", "string"),
];

pub const ISSUER_TYPE: &[FieldDef] = &[
    FieldDef::new("id", "string"),
    FieldDef::new("ethereumAddress", "string"),
];

pub const MEMBERSHIP_SUBJECT_TYPE: &[FieldDef] = &[
    FieldDef::new("id", "string"),
    FieldDef::new("organizationName", "string"),
    FieldDef::new("membershipName", "string"),
    FieldDef::new("organizationId", "string"),
    FieldDef::new("membershipId", "string"),
];

pub const EVENT_ATTENDANCE_TYPE: &[FieldDef] = &[
    FieldDef::new("id", "string"),
    FieldDef::new("eventName", "string"),
    FieldDef::new("eventIcon", "string"),
    FieldDef::new("eventId", "string"),
];

pub const CERTIFICATION_TYPE: &[FieldDef] = &[
    FieldDef::new("id", "string"),
    FieldDef::new("certificationId", "string"),
    FieldDef::new("certificationName", "string"),
    FieldDef::new("image", "string"),
];

/// Subject of a `WorkCredential` verifiable credential.
pub const WORK_SUBJECT_TYPE: &[FieldDef] = &[
    FieldDef::new("id", "string"),
    FieldDef::new("work", "Work"),
    FieldDef::new("tx", "TX"),
    FieldDef::new("deliverables", "DeliverableItem[]"),
    FieldDef::new("client", "Client"),
];

/// Holder-signed work subject (no holder id).
pub const WORK_CREDENTIAL_SUBJECT_TYPE: &[FieldDef] = &[
    FieldDef::new("work", "Work"),
    FieldDef::new("tx", "TX"),
    FieldDef::new("deliverables", "DeliverableItem[]"),
    FieldDef::new("client", "Client"),
];

pub const WORK_TYPE: &[FieldDef] = &[
    FieldDef::new("id", "string"),
    FieldDef::new("value", "string"),
    FieldDef::new("tax", "string"),
    FieldDef::new("summary", "string"),
    FieldDef::new("detail", "string"),
    FieldDef::new("jobType", "string"),
    FieldDef::new("genre", "string"),
    FieldDef::new("tags", "string[]"),
    FieldDef::new("startTimestamp", "string"),
    FieldDef::new("endTimestamp", "string"),
    FieldDef::new("platform", "string"),
    FieldDef::new("deliverableHash", "string"),
    FieldDef::new("organization", "string"),
    FieldDef::new("issuedAt", "string"),
];

pub const TX_TYPE: &[FieldDef] = &[
    FieldDef::new("txHash", "string"),
    FieldDef::new("to", "string"),
    FieldDef::new("from", "string"),
    FieldDef::new("isPayer", "bool"),
    FieldDef::new("value", "string"),
    FieldDef::new("tokenSymbol", "string"),
    FieldDef::new("tokenDecimal", "uint256"),
    FieldDef::new("fiatValue", "string"),
    FieldDef::new("fiatSymbol", "string"),
    FieldDef::new("networkId", "uint256"),
    FieldDef::new("issuedTimestamp", "string"),
    FieldDef::new("relatedAddresses", "string[]"),
    FieldDef::new("relatedTxHashes", "string[]"),
];

pub const DELIVERABLE_ITEM_TYPE: &[FieldDef] = &[
    FieldDef::new("format", "string"),
    FieldDef::new("value", "string"),
];

pub const CLIENT_TYPE: &[FieldDef] = &[
    FieldDef::new("format", "string"),
    FieldDef::new("value", "string"),
];

pub const SIGNATURES_TYPE: &[FieldDef] = &[
    FieldDef::new("holderSig", "string"),
    FieldDef::new("partnerSigner", "string"),
    FieldDef::new("partnerSig", "string"),
    FieldDef::new("agentSigner", "string"),
    FieldDef::new("agentSig", "string"),
];

pub const WORK_CREDENTIAL_TYPE: &[FieldDef] = &[
    FieldDef::new("id", "string"),
    FieldDef::new("subject", "WorkCredentialSubject"),
    FieldDef::new("signature", "Signatures"),
    FieldDef::new("createdAt", "string"),
    FieldDef::new("updatedAt", "string"),
];

/// Composite types a work subject may reference.
pub const WORK_NESTED_TYPES: &[(&str, &[FieldDef])] = &[
    ("Work", WORK_TYPE),
    ("TX", TX_TYPE),
    ("DeliverableItem", DELIVERABLE_ITEM_TYPE),
    ("Client", CLIENT_TYPE),
];

/// Supported credential kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialKind {
    Membership,
    EventAttendance,
    Work,
    Certification,
}

impl CredentialKind {
    pub const ALL: [CredentialKind; 4] = [
        CredentialKind::Membership,
        CredentialKind::EventAttendance,
        CredentialKind::Work,
        CredentialKind::Certification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::Membership => "membership",
            CredentialKind::EventAttendance => "event-attendance",
            CredentialKind::Work => "work",
            CredentialKind::Certification => "certification",
        }
    }

    pub fn descriptor(&self) -> &'static CredentialKindDescriptor {
        describe(*self)
    }

    /// Look up a kind by its `vcType` tag (e.g. `EventAttendanceCredential`).
    pub fn from_vc_type(vc_type: &str) -> Result<Self, CredentialError> {
        Self::ALL
            .into_iter()
            .find(|k| describe(*k).vc_type == vc_type)
            .ok_or_else(|| CredentialError::UnknownCredentialKind(vc_type.to_string()))
    }

    /// Infer the kind from a credential's `type` array.
    pub fn from_credential_types(types: &[String]) -> Result<Self, CredentialError> {
        types
            .iter()
            .find_map(|t| Self::from_vc_type(t).ok())
            .ok_or_else(|| CredentialError::UnknownCredentialKind(types.join(",")))
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialKind {
    type Err = CredentialError;

    /// Accepts the kebab-case name or the `vcType` tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .map_or_else(|| Self::from_vc_type(s), Ok)
    }
}

/// Static description of one credential kind.
#[derive(Debug, PartialEq, Eq)]
pub struct CredentialKindDescriptor {
    pub kind: CredentialKind,
    /// Kind-specific tag placed after `VerifiableCredential` in `type`.
    pub vc_type: &'static str,
    /// EIP-712 domain name.
    pub domain: &'static str,
    /// JSON schema the subject conforms to.
    pub schema_uri: &'static str,
    /// Members of the `CredentialSubject` type.
    pub subject_fields: &'static [FieldDef],
    /// Composite types the subject may reference.
    pub nested_types: &'static [(&'static str, &'static [FieldDef])],
}

impl CredentialKindDescriptor {
    /// Fields of a nested composite type, if this kind declares it.
    pub fn nested_type(&self, name: &str) -> Option<&'static [FieldDef]> {
        self.nested_types
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, fields)| *fields)
    }
}

static MEMBERSHIP: CredentialKindDescriptor = CredentialKindDescriptor {
    kind: CredentialKind::Membership,
    vc_type: "MembershipCredential",
    domain: "Verifiable Membership Subject",
    schema_uri: "https://app.vess.id/schemas/VerifiableMembershipSubject.json",
    subject_fields: MEMBERSHIP_SUBJECT_TYPE,
    nested_types: &[],
};

static EVENT_ATTENDANCE: CredentialKindDescriptor = CredentialKindDescriptor {
    kind: CredentialKind::EventAttendance,
    vc_type: "EventAttendanceCredential",
    domain: "Verifiable Event Attendance",
    schema_uri: "https://app.vess.id/schemas/EventAttendance.json",
    subject_fields: EVENT_ATTENDANCE_TYPE,
    nested_types: &[],
};

static WORK: CredentialKindDescriptor = CredentialKindDescriptor {
    kind: CredentialKind::Work,
    vc_type: "WorkCredential",
    domain: "Verifiable Work Credential",
    schema_uri: "https://app.vess.id/schemas/WorkCredential.json",
    subject_fields: WORK_SUBJECT_TYPE,
    nested_types: WORK_NESTED_TYPES,
};

static CERTIFICATION: CredentialKindDescriptor = CredentialKindDescriptor {
    kind: CredentialKind::Certification,
    vc_type: "CertificationCredential",
    domain: "Verifiable Certification Subject",
    schema_uri: "https://app.vess.id/schemas/CertificationSubject.json",
    subject_fields: CERTIFICATION_TYPE,
    nested_types: &[],
};

/// Descriptor for a credential kind.
pub fn describe(kind: CredentialKind) -> &'static CredentialKindDescriptor {
    match kind {
        CredentialKind::Membership => &MEMBERSHIP,
        CredentialKind::EventAttendance => &EVENT_ATTENDANCE,
        CredentialKind::Work => &WORK,
        CredentialKind::Certification => &CERTIFICATION,
    }
}

/// Descriptor for a kind named by a compile-time constant.
///
/// # Panics
///
/// Panics if `name` is not a known kind name or `vcType`. Use
/// [`CredentialKind::from_str`] for untrusted input.
pub fn describe_by_name(name: &str) -> &'static CredentialKindDescriptor {
    match name.parse::<CredentialKind>() {
        Ok(kind) => describe(kind),
        Err(_) => panic!("unknown credential kind: {name}"),
    }
}
