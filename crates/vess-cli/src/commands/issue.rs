//! `vess issue`: Issue a signed verifiable credential with a local key.

use chrono::{DateTime, Utc};
use clap::Args;
use std::path::{Path, PathBuf};

use vess_core::EngineConfig;
use vess_credentials::{
    CertificationSubject, CredentialIssuer, CredentialKind, EventAttendanceSubject,
    IssueOptions, MembershipSubject, Subject, WorkSubject,
};
use vess_crypto::KeyPair;

use super::{emit, read_json_arg};

#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Credential kind (membership, event-attendance, work, certification).
    #[arg(short, long)]
    pub kind: CredentialKind,

    /// Issuer private key (hex, or path to a file containing it).
    #[arg(long)]
    pub key: String,

    /// Subject JSON (as string or path to file).
    #[arg(short, long)]
    pub subject: String,

    /// Credential id. Derived from the subject when omitted.
    #[arg(long)]
    pub id: Option<String>,

    /// Extra `@context` URIs, comma-separated.
    #[arg(long, value_delimiter = ',')]
    pub context: Vec<String>,

    /// Expiration (RFC 3339). Defaults to 100 years after issuance.
    #[arg(long)]
    pub expires: Option<DateTime<Utc>>,

    /// Write the credential to this file instead of stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

fn load_key(arg: &str) -> anyhow::Result<KeyPair> {
    let text = if Path::new(arg).exists() {
        std::fs::read_to_string(arg)?
    } else {
        arg.to_string()
    };
    Ok(KeyPair::from_hex(text.trim())?)
}

async fn issue_typed<S: Subject>(
    issuer: &CredentialIssuer,
    subject: serde_json::Value,
    id: Option<&str>,
    options: &IssueOptions,
) -> anyhow::Result<serde_json::Value> {
    let subject: S = serde_json::from_value(subject)
        .map_err(|e| anyhow::anyhow!("subject does not match the {} shape: {}", S::KIND, e))?;
    let id = match id {
        Some(id) => id.to_string(),
        None => subject.credential_id(),
    };
    let vc = issuer
        .issue(S::KIND.descriptor(), id, subject, options)
        .await?;
    Ok(serde_json::to_value(&vc)?)
}

pub async fn run(args: &IssueArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let keypair = load_key(&args.key)?;
    let issuer = CredentialIssuer::from_keypair(keypair).with_config(config.eip712.clone());
    let subject = read_json_arg(&args.subject)?;
    let options = IssueOptions {
        extra_contexts: args.context.clone(),
        expiration: args.expires,
    };
    let id = args.id.as_deref();

    let vc = match args.kind {
        CredentialKind::Membership => {
            issue_typed::<MembershipSubject>(&issuer, subject, id, &options).await?
        }
        CredentialKind::EventAttendance => {
            issue_typed::<EventAttendanceSubject>(&issuer, subject, id, &options).await?
        }
        CredentialKind::Work => issue_typed::<WorkSubject>(&issuer, subject, id, &options).await?,
        CredentialKind::Certification => {
            issue_typed::<CertificationSubject>(&issuer, subject, id, &options).await?
        }
    };

    emit(&serde_json::to_string_pretty(&vc)?, args.out.as_deref())
}
