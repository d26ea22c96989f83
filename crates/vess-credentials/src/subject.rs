//! Typed credential subjects.
//!
//! Optional text members of the top-level subjects default to `""` when a
//! subject is built, so every declared EIP-712 member is present when it is
//! hashed. Nested work types carry no defaults: deserialization must not
//! invent members that were never signed. Members outside the EIP-712 type
//! are kept in `extra` and survive a typed round trip unhashed.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::CredentialKind;

/// A subject payload bound to its credential kind.
pub trait Subject: Serialize + DeserializeOwned + Send + Sync {
    const KIND: CredentialKind;

    /// DID of the holder the credential is about.
    fn subject_id(&self) -> &str;

    /// Conventional credential id for this subject.
    fn credential_id(&self) -> String;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipSubject {
    pub id: String,
    #[serde(default)]
    pub organization_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_icon: Option<String>,
    #[serde(default)]
    pub membership_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_icon: Option<String>,
    pub organization_id: String,
    pub membership_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Members not covered by the typed fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Subject for MembershipSubject {
    const KIND: CredentialKind = CredentialKind::Membership;

    fn subject_id(&self) -> &str {
        &self.id
    }

    /// `{organizationId}-{membershipId}-{holderDid}`
    fn credential_id(&self) -> String {
        format!("{}-{}-{}", self.organization_id, self.membership_id, self.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttendanceSubject {
    pub id: String,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub event_icon: String,
    pub event_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventAttendanceSubject {
    pub fn new(
        holder: impl Into<String>,
        event_id: impl Into<String>,
        event_name: impl Into<String>,
    ) -> Self {
        Self {
            id: holder.into(),
            event_name: event_name.into(),
            event_icon: String::new(),
            event_id: event_id.into(),
            extra: Map::new(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.event_icon = icon.into();
        self
    }
}

impl Subject for EventAttendanceSubject {
    const KIND: CredentialKind = CredentialKind::EventAttendance;

    fn subject_id(&self) -> &str {
        &self.id
    }

    /// `{eventId}-{holderDid}`
    fn credential_id(&self) -> String {
        format!("{}-{}", self.event_id, self.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationSubject {
    pub id: String,
    pub certification_id: String,
    #[serde(default)]
    pub certification_name: String,
    #[serde(default)]
    pub image: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Subject for CertificationSubject {
    const KIND: CredentialKind = CredentialKind::Certification;

    fn subject_id(&self) -> &str {
        &self.id
    }

    /// `{certificationId}-{holderDid}`
    fn credential_id(&self) -> String {
        format!("{}-{}", self.certification_id, self.id)
    }
}

/// The piece of work a work credential attests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub id: String,
    pub value: String,
    pub tax: String,
    pub summary: String,
    pub detail: String,
    pub job_type: String,
    pub genre: String,
    pub tags: Vec<String>,
    pub start_timestamp: String,
    pub end_timestamp: String,
    pub platform: String,
    pub deliverable_hash: String,
    pub organization: String,
    pub issued_at: String,
}

/// On-chain payment backing a work credential. Encoded as EIP-712 type `TX`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub tx_hash: String,
    pub to: String,
    pub from: String,
    pub is_payer: bool,
    pub value: String,
    pub token_symbol: String,
    pub token_decimal: u64,
    pub fiat_value: String,
    pub fiat_symbol: String,
    pub network_id: u64,
    pub issued_timestamp: String,
    pub related_addresses: Vec<String>,
    pub related_tx_hashes: Vec<String>,
}

/// A deliverable, referenced by URL or CID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverableItem {
    pub format: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub format: String,
    pub value: String,
}

/// Subject of a `WorkCredential` verifiable credential.
///
/// Absent `work`, `tx` and `client` encode as zero words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSubject {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<Work>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx: Option<Transaction>,
    #[serde(default)]
    pub deliverables: Vec<DeliverableItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<Client>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Subject for WorkSubject {
    const KIND: CredentialKind = CredentialKind::Work;

    fn subject_id(&self) -> &str {
        &self.id
    }

    /// `{workId}-{holderDid}`, with an empty work id when `work` is absent.
    fn credential_id(&self) -> String {
        let work_id = self.work.as_ref().map_or("", |w| w.id.as_str());
        format!("{}-{}", work_id, self.id)
    }
}
