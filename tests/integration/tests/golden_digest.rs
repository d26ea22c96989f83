//! Integration test: byte-exact digests against independently computed vectors.
//!
//! The credential fixture and hashes were produced by a separate EIP-712
//! implementation from the same envelope, descriptor and domain name.

use serde_json::{json, Value};

use vess_core::Eip712Config;
use vess_credentials::{
    digest_for, CredentialBuilder, CredentialIssuer, CredentialKind, CredentialVerifier,
    EventAttendanceSubject, IssueOptions,
};
use vess_crypto::{recover_typed_data, sign_typed_data, TypedData};
use vess_integration_tests::{cow_keypair, fixed_now, COW_ADDRESS, HOLDER_DID};

const EVENT_DIGEST: &str = include_str!("fixtures/event_attendance_digest.json");

fn mail() -> TypedData {
    serde_json::from_value(json!({
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"},
                {"name": "version", "type": "string"},
                {"name": "chainId", "type": "uint256"},
                {"name": "verifyingContract", "type": "address"}
            ],
            "Person": [
                {"name": "name", "type": "string"},
                {"name": "wallet", "type": "address"}
            ],
            "Mail": [
                {"name": "from", "type": "Person"},
                {"name": "to", "type": "Person"},
                {"name": "contents", "type": "string"}
            ]
        },
        "primaryType": "Mail",
        "domain": {
            "name": "Ether Mail",
            "version": "1",
            "chainId": 1,
            "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
        },
        "message": {
            "from": {"name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"},
            "to": {"name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"},
            "contents": "Hello, Bob!"
        }
    }))
    .unwrap()
}

fn event_subject() -> EventAttendanceSubject {
    EventAttendanceSubject::new(HOLDER_DID, "evt-1", "Conf2024")
}

// =========================================================================
// Canonical "Mail" vector
// =========================================================================

#[test]
fn test_mail_vector_hashes() {
    let data = mail();
    assert_eq!(
        data.types.encode_type("Mail").unwrap(),
        "Mail(Person from,Person to,string contents)Person(string name,address wallet)"
    );
    assert_eq!(
        hex::encode(data.types.type_hash("Mail").unwrap()),
        "a0cedeb2dc280ba39b857546d74f5549c3a1d7bdc2dd96bf881f76108e23dac2"
    );
    assert_eq!(
        hex::encode(data.domain_separator().unwrap()),
        "f2cee375fa42b42143804025fc449deafd50cc031ca257e0b194a650a912090f"
    );
    assert_eq!(
        hex::encode(data.message_hash().unwrap()),
        "c52c0ee5d84264471806290a3f2c4cecfc5490626bf912d01f240d7a274b371e"
    );
    assert_eq!(
        hex::encode(data.signing_hash().unwrap()),
        "be609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2"
    );
}

#[test]
fn test_mail_vector_signature() {
    let data = mail();
    let signature = sign_typed_data(&data, &cow_keypair()).unwrap();
    assert_eq!(
        signature.to_hex(),
        "0x4355c47d63924e8a72e509b65029052eb6c299d53a04e167c5775fd466751c9d\
         07299936d304c153f6443dfa05f40ff007d72911b6f72307f996231605b915621c"
    );
    assert_eq!(
        recover_typed_data(&data, &signature.to_hex()).unwrap(),
        COW_ADDRESS
    );
}

// =========================================================================
// Credential digest
// =========================================================================

#[test]
fn test_event_attendance_digest_is_byte_identical() {
    let descriptor = CredentialKind::EventAttendance.descriptor();
    let subject = event_subject();
    let id = format!("evt-1-{}", HOLDER_DID);
    let envelope = CredentialBuilder::new(COW_ADDRESS, id, descriptor, subject)
        .build_at(fixed_now())
        .unwrap();
    let digest = digest_for(descriptor, &envelope, &Eip712Config::default()).unwrap();

    let golden: Value = serde_json::from_str(EVENT_DIGEST).unwrap();
    assert_eq!(serde_json::to_value(&digest).unwrap(), golden);
    assert_eq!(
        digest.to_json_string().unwrap(),
        serde_json::to_string(&golden).unwrap()
    );

    assert_eq!(
        digest.types.encode_type("VerifiableCredential").unwrap(),
        "VerifiableCredential(string[] @context,string[] type,string id,Issuer issuer,\
         CredentialSubject credentialSubject,CredentialSchema credentialSchema,\
         string issuanceDate,string expirationDate)\
         CredentialSchema(string id,string type)\
         CredentialSubject(string id,string eventName,string eventIcon,string eventId)\
         Issuer(string id,string ethereumAddress)"
    );
    assert_eq!(
        hex::encode(digest.domain_separator().unwrap()),
        "8c74af33661d388b781836f54bf894c6ca36ed851335340c3d799a8f8f39f090"
    );
    assert_eq!(
        hex::encode(digest.message_hash().unwrap()),
        "0a7442ac06b67e8d283e36df7d2dd3031f7d3af18470768229062171f98abb45"
    );
    assert_eq!(
        hex::encode(digest.signing_hash().unwrap()),
        "955d14ce778aebacca2220f8fd2594ec8480cc95ce6d254ea071c93ee49f2613"
    );
}

#[test]
fn test_golden_digest_parses_to_same_hash() {
    let parsed: TypedData = serde_json::from_str(EVENT_DIGEST).unwrap();
    assert_eq!(
        hex::encode(parsed.signing_hash().unwrap()),
        "955d14ce778aebacca2220f8fd2594ec8480cc95ce6d254ea071c93ee49f2613"
    );
}

#[tokio::test]
async fn test_issued_proof_echoes_golden_digest() {
    let issuer = CredentialIssuer::from_keypair(cow_keypair());
    let vc = issuer
        .issue_subject_at(fixed_now(), event_subject(), &IssueOptions::default())
        .await
        .unwrap();

    let golden: Value = serde_json::from_str(EVENT_DIGEST).unwrap();
    let echo = serde_json::to_value(&vc.proof.eip712).unwrap();
    assert_eq!(echo["domain"], golden["domain"]);
    assert_eq!(echo["types"], golden["types"]);
    assert_eq!(echo["primaryType"], golden["primaryType"]);
    assert_eq!(vc.proof.created, "2024-05-01T12:00:00.000Z");

    // The signature is over the golden digest.
    let parsed: TypedData = serde_json::from_str(EVENT_DIGEST).unwrap();
    assert_eq!(
        recover_typed_data(&parsed, &vc.proof.proof_value).unwrap(),
        COW_ADDRESS
    );
    assert!(CredentialVerifier::default()
        .verify(CredentialKind::EventAttendance.descriptor(), &vc)
        .await
        .unwrap());
}
