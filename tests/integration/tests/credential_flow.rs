//! Integration test: issuance and verification across crates.
//!
//! Exercises the issuer → holder → verifier flow using vess-credentials,
//! vess-crypto and vess-core together, with local keys and injected
//! signing callbacks.

use std::sync::Arc;

use chrono::Duration;
use proptest::prelude::*;
use serde_json::{json, Value};

use vess_core::{Did, Eip712Config};
use vess_credentials::work::{
    countersign_work_credential, create_work_credential_at, verify_holder_signature,
    verify_work_signature,
};
use vess_credentials::{
    BoxError, CredentialError, CredentialIssuer, CredentialKind, CredentialVerifier,
    DeliverableItem, EventAttendanceSubject, FnSigner, IssueOptions, LocalSigner,
    MembershipSubject, Secp256k1Recoverer, Subject, VerifiableCredential, Work,
    WorkCredentialSubject, WorkSubject,
};
use vess_crypto::{KeyPair, TypedData};
use vess_integration_tests::{fixed_now, HOLDER_DID};

fn event_subject() -> EventAttendanceSubject {
    EventAttendanceSubject::new(HOLDER_DID, "evt-1", "Conf2024")
}

async fn issue_event(issuer: &CredentialIssuer) -> VerifiableCredential<EventAttendanceSubject> {
    issuer
        .issue_subject_at(fixed_now(), event_subject(), &IssueOptions::default())
        .await
        .expect("issuance should succeed")
}

// =========================================================================
// Issuer → holder → verifier
// =========================================================================

#[tokio::test]
async fn test_issue_and_verify_round_trip() {
    let issuer = CredentialIssuer::from_keypair(KeyPair::generate());
    let vc = issue_event(&issuer).await;

    // Holder receives the credential as JSON.
    let wire = serde_json::to_string(&vc).unwrap();
    let received: Value = serde_json::from_str(&wire).unwrap();

    let verifier = CredentialVerifier::default();
    assert!(verifier
        .verify_json(CredentialKind::EventAttendance, &received)
        .await
        .unwrap());

    let typed: VerifiableCredential<EventAttendanceSubject> =
        serde_json::from_value(received).unwrap();
    assert_eq!(typed, vc);
    assert!(verifier
        .verify(CredentialKind::EventAttendance.descriptor(), &typed)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_event_attendance_envelope_and_proof() {
    let address = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    let signer = FnSigner::new(|_data: TypedData| async {
        Ok::<_, BoxError>("0x".to_string() + &"11".repeat(65))
    });
    let issuer = CredentialIssuer::new(address, Arc::new(signer));
    let holder = format!("did:pkh:eip155:1:{}", address);
    let subject = EventAttendanceSubject::new(holder, "evt-1", "Conf2024");
    let vc = issuer
        .issue_subject_at(fixed_now(), subject, &IssueOptions::default())
        .await
        .unwrap();

    assert_eq!(vc.types, vec!["VerifiableCredential", "EventAttendanceCredential"]);
    assert_eq!(vc.issuer.id, format!("did:pkh:eip155:1:{}", address));
    assert_eq!(vc.issuer.ethereum_address, address);
    assert_eq!(vc.proof.proof_type, "EthereumEip712Signature2021");
    assert_eq!(vc.proof.proof_purpose, "assertionMethod");
    assert_eq!(vc.issuance_date, "2024-05-01T12:00:00.000Z");
    assert_eq!(vc.expiration_date, "2124-05-01T12:00:00.000Z");
}

#[tokio::test]
async fn test_signature_for_different_id_is_rejected() {
    let issuer = CredentialIssuer::from_keypair(KeyPair::generate());
    let original = issue_event(&issuer).await;
    let descriptor = CredentialKind::EventAttendance.descriptor();
    let other = issuer
        .issue_at(
            fixed_now(),
            descriptor,
            "some-other-id",
            event_subject(),
            &IssueOptions::default(),
        )
        .await
        .unwrap();

    // Same subject, different credential id: the borrowed proof must fail.
    let mut forged = original.clone();
    forged.proof.proof_value = other.proof.proof_value.clone();

    let verifier = CredentialVerifier::default();
    assert!(verifier.verify(descriptor, &original).await.unwrap());
    assert!(!verifier.verify(descriptor, &forged).await.unwrap());
}

#[tokio::test]
async fn test_expiration_override_is_respected() {
    let issuer = CredentialIssuer::from_keypair(KeyPair::generate());
    let expires = fixed_now() + Duration::days(30);
    let vc = issuer
        .issue_subject_at(
            fixed_now(),
            event_subject(),
            &IssueOptions {
                expiration: Some(expires),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(vc.expiration_date, "2024-05-31T12:00:00.000Z");

    let result = CredentialVerifier::default()
        .inspect(
            CredentialKind::EventAttendance.descriptor(),
            &vc,
            fixed_now() + Duration::days(31),
        )
        .await
        .unwrap();
    assert!(!result.valid);
    assert!(result.check("signature_valid").unwrap().passed);
    assert!(!result.check("not_expired").unwrap().passed);
}

#[tokio::test]
async fn test_inspect_passes_every_check() {
    let issuer = CredentialIssuer::from_keypair(KeyPair::generate());
    let vc = issue_event(&issuer).await;
    let result = CredentialVerifier::default()
        .inspect(CredentialKind::EventAttendance.descriptor(), &vc, fixed_now())
        .await
        .unwrap();
    assert!(result.valid);
    assert_eq!(result.checks.len(), 5);
    assert!(result.checks.iter().all(|c| c.passed));
}

#[tokio::test]
async fn test_did_issuer_signs_and_verifies() {
    let kp = KeyPair::generate();
    let address = kp.address();
    let did = format!("did:pkh:eip155:1:{}", address.to_lowercase());
    let issuer = CredentialIssuer::new(did.clone(), Arc::new(LocalSigner::new(kp)));

    let vc = issue_event(&issuer).await;
    assert_eq!(vc.issuer.id, did);
    assert_eq!(vc.issuer.ethereum_address, address.to_lowercase());
    assert_eq!(vc.proof.verification_method, format!("{}#ethereumAddress", did));

    let result = CredentialVerifier::default()
        .inspect(CredentialKind::EventAttendance.descriptor(), &vc, fixed_now())
        .await
        .unwrap();
    assert!(result.valid);

    let wire = serde_json::to_value(&vc).unwrap();
    assert!(CredentialVerifier::default()
        .verify_json(CredentialKind::EventAttendance, &wire)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_non_ethereum_did_issuer_is_rejected() {
    let issuer = CredentialIssuer::new(
        "did:web:example.com",
        Arc::new(LocalSigner::new(KeyPair::generate())),
    );
    let result = issuer
        .issue_subject_at(fixed_now(), event_subject(), &IssueOptions::default())
        .await;
    assert!(matches!(result, Err(CredentialError::InvalidInput(_))));
}

#[tokio::test]
async fn test_work_credential_without_work_verifies_both_ways() {
    let issuer = CredentialIssuer::from_keypair(KeyPair::generate());
    let subject = WorkSubject {
        id: HOLDER_DID.into(),
        ..Default::default()
    };
    let vc = issuer
        .issue_subject_at(fixed_now(), subject, &IssueOptions::default())
        .await
        .unwrap();
    let wire = serde_json::to_value(&vc).unwrap();
    assert!(wire["credentialSubject"].get("work").is_none());

    let verifier = CredentialVerifier::default();
    let typed: VerifiableCredential<WorkSubject> = serde_json::from_value(wire.clone()).unwrap();
    assert_eq!(
        verifier.verify(CredentialKind::Work.descriptor(), &typed).await.unwrap(),
        verifier.verify_json(CredentialKind::Work, &wire).await.unwrap()
    );
    assert!(verifier.verify(CredentialKind::Work.descriptor(), &typed).await.unwrap());
}

// =========================================================================
// Tampering
// =========================================================================

#[tokio::test]
async fn test_tampered_fields_fail_verification() {
    let issuer = CredentialIssuer::from_keypair(KeyPair::generate());
    let vc = issue_event(&issuer).await;
    let json = serde_json::to_value(&vc).unwrap();
    let verifier = CredentialVerifier::default();

    let edits = [
        ("/credentialSubject/eventName", json!("Other")),
        ("/issuanceDate", json!("2024-05-01T13:00:00.000Z")),
        ("/expirationDate", json!("2200-01-01T00:00:00.000Z")),
        ("/credentialSchema/id", json!("https://example.com/x.json")),
        ("/@context/1", json!("https://example.com/ctx")),
        ("/type/1", json!("OtherCredential")),
        ("/issuer/ethereumAddress", json!("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa")),
    ];
    for (pointer, value) in edits {
        let mut tampered = json.clone();
        *tampered.pointer_mut(pointer).unwrap() = value;
        assert!(
            !verifier
                .verify_json(CredentialKind::EventAttendance, &tampered)
                .await
                .unwrap(),
            "tampered {} still verified",
            pointer
        );
    }
}

#[tokio::test]
async fn test_config_mismatch_fails_verification() {
    let issuer = CredentialIssuer::from_keypair(KeyPair::generate()).with_config(Eip712Config {
        chain_id: 10,
        ..Eip712Config::default()
    });
    let vc = issue_event(&issuer).await;
    let descriptor = CredentialKind::EventAttendance.descriptor();

    assert!(!CredentialVerifier::default().verify(descriptor, &vc).await.unwrap());
    assert!(CredentialVerifier::default()
        .with_config(issuer.config().clone())
        .verify(descriptor, &vc)
        .await
        .unwrap());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_changed_event_name_never_verifies(name in "[A-Za-z0-9 ]{1,24}") {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let issuer = CredentialIssuer::from_keypair(KeyPair::generate());
            let vc = issue_event(&issuer).await;
            let mut tampered = vc.clone();
            tampered.envelope.credential_subject.event_name = name.clone();
            let verifier = CredentialVerifier::default();
            let descriptor = CredentialKind::EventAttendance.descriptor();
            prop_assert_eq!(
                verifier.verify(descriptor, &tampered).await.unwrap(),
                name == "Conf2024"
            );
            Ok(())
        })?;
    }
}

// =========================================================================
// Batches and kinds
// =========================================================================

#[tokio::test]
async fn test_membership_batch_verifies() {
    let issuer = CredentialIssuer::from_keypair(KeyPair::generate());
    let subjects: Vec<_> = (1..=3)
        .map(|i| MembershipSubject {
            id: format!("did:pkh:eip155:1:0x{:040x}", i),
            organization_name: "VESS".into(),
            membership_name: "Core".into(),
            organization_id: "org-1".into(),
            membership_id: "core".into(),
            ..Default::default()
        })
        .collect();
    let vcs = issuer
        .issue_batch(subjects, &IssueOptions::default())
        .await
        .unwrap();

    let verifier = CredentialVerifier::default();
    for vc in &vcs {
        assert!(vc.id.starts_with("org-1-core-did:pkh:eip155:1:0x"));
        assert!(verifier
            .verify(CredentialKind::Membership.descriptor(), vc)
            .await
            .unwrap());
    }
}

#[tokio::test]
async fn test_batch_fails_as_a_whole() {
    let issuer = CredentialIssuer::from_keypair(KeyPair::generate());
    let subjects = vec![
        event_subject(),
        EventAttendanceSubject::new(HOLDER_DID, "evt-2", "Conf2025"),
    ];
    let result = issuer
        .issue_batch(
            subjects,
            &IssueOptions {
                expiration: Some(fixed_now()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(CredentialError::InvalidInput(_))));
}

#[tokio::test]
async fn test_work_credential_vc_round_trip() {
    let issuer = CredentialIssuer::from_keypair(KeyPair::generate());
    let subject = WorkSubject {
        id: HOLDER_DID.into(),
        work: Some(Work {
            id: "w-1".into(),
            summary: "Logo design".into(),
            tags: vec!["design".into()],
            ..Default::default()
        }),
        deliverables: vec![DeliverableItem {
            format: "url".into(),
            value: "https://example.com/logo.png".into(),
        }],
        ..Default::default()
    };
    assert_eq!(subject.credential_id(), format!("w-1-{}", HOLDER_DID));
    let vc = issuer
        .issue_subject(subject, &IssueOptions::default())
        .await
        .unwrap();
    assert_eq!(vc.types[1], "WorkCredential");

    let json = serde_json::to_value(&vc).unwrap();
    assert!(CredentialVerifier::default()
        .verify_json(CredentialKind::Work, &json)
        .await
        .unwrap());
}

// =========================================================================
// Domain separation and identity
// =========================================================================

#[tokio::test]
async fn test_signature_does_not_transfer_across_kinds() {
    let issuer = CredentialIssuer::from_keypair(KeyPair::generate());
    let vc = issue_event(&issuer).await;
    let mut json = serde_json::to_value(&vc).unwrap();
    json["type"][1] = "MembershipCredential".into();

    // Re-labelled credential cannot be encoded as a membership subject.
    let relabelled = CredentialVerifier::default()
        .verify_json(CredentialKind::Membership, &json)
        .await;
    assert!(!matches!(relabelled, Ok(true)));
}

#[test]
fn test_did_derivation_is_deterministic() {
    let kp = KeyPair::generate();
    let a = Did::from_address(&kp.address()).unwrap();
    let b = Did::from_address(&kp.address().to_lowercase()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_string(), format!("did:pkh:eip155:1:{}", kp.address().to_lowercase()));
    assert_eq!(a.ethereum_address(), Some(kp.address().to_lowercase().as_str()));
}

// =========================================================================
// Holder-signed work credentials
// =========================================================================

#[tokio::test]
async fn test_work_credential_holder_and_partner_signatures() {
    let holder = KeyPair::generate();
    let partner = KeyPair::generate();
    let holder_address = holder.address();
    let partner_address = partner.address();
    let config = Eip712Config::default();

    let subject = WorkCredentialSubject {
        work: Some(Work {
            id: "w-9".into(),
            summary: "Audit".into(),
            ..Default::default()
        }),
        ..Default::default()
    };
    let created = create_work_credential_at(
        fixed_now(),
        "wc-1",
        subject,
        &LocalSigner::new(holder),
        &config,
    )
    .await
    .unwrap();
    assert_eq!(created.created_at, "1714564800");
    assert!(verify_holder_signature(&created, &holder_address, &Secp256k1Recoverer, &config)
        .await
        .unwrap());

    let later = fixed_now() + Duration::hours(1);
    let countersigned = countersign_work_credential(
        &created,
        partner_address.clone(),
        &LocalSigner::new(partner),
        &config,
        later,
    )
    .await
    .unwrap();
    assert_eq!(countersigned.updated_at, "1714568400");
    assert_eq!(countersigned.created_at, created.created_at);
    assert_eq!(countersigned.signature.holder_sig, created.signature.holder_sig);

    let partner_sig = countersigned.signature.partner_sig.clone().unwrap();
    assert!(verify_work_signature(
        &countersigned,
        &partner_sig,
        &partner_address,
        &Secp256k1Recoverer,
        &config
    )
    .await
    .unwrap());
    assert!(!verify_work_signature(
        &countersigned,
        &partner_sig,
        &holder_address,
        &Secp256k1Recoverer,
        &config
    )
    .await
    .unwrap());
}
