//! VESS Credentials: EIP-712 signed W3C verifiable credentials.
//!
//! Issuance runs builder → digest assembler → injected signer → proof
//! attachment. Verification reassembles the same digest from the received
//! envelope, recovers the signer through an injected recoverer, and compares
//! the recovered address with the claimed issuer.

pub mod credential;
pub mod digest;
pub mod error;
pub mod issuer;
pub mod schema;
pub mod signer;
pub mod subject;
pub mod verifier;
pub mod work;

pub use credential::{
    CredentialBuilder, CredentialEnvelope, CredentialSchemaRef, Eip712Echo, Issuer, Proof,
    VerifiableCredential,
};
pub use digest::{assemble_digest, credential_type_table, digest_for};
pub use error::{BoxError, CredentialError};
pub use issuer::{CredentialIssuer, IssueOptions};
pub use schema::{describe, describe_by_name, CredentialKind, CredentialKindDescriptor, FieldDef};
pub use signer::{
    FnRecoverer, FnSigner, JsonStringSigner, LocalSigner, PresignedSigner, Secp256k1Recoverer,
    TypedDataRecoverer, TypedDataSigner,
};
pub use subject::{
    CertificationSubject, Client, DeliverableItem, EventAttendanceSubject, MembershipSubject,
    Subject, Transaction, Work, WorkSubject,
};
pub use verifier::{split_credential_json, CredentialVerifier, VerificationCheck, VerificationResult};
pub use work::{Signatures, WorkCredential, WorkCredentialSubject};
