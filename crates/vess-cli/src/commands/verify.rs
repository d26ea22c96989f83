//! `vess verify`: Verify a verifiable credential.

use chrono::Utc;
use clap::Args;

use vess_core::EngineConfig;
use vess_credentials::{CredentialKind, CredentialVerifier};

use super::load_credential;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Credential JSON (as string or path to file).
    pub credential: String,

    /// Credential kind. Inferred from the `type` array when omitted.
    #[arg(short, long)]
    pub kind: Option<CredentialKind>,
}

pub async fn run(args: &VerifyArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let (kind, credential) = load_credential(&args.credential, args.kind)?;
    let verifier = CredentialVerifier::default().with_config(config.eip712.clone());
    let result = verifier
        .inspect(kind.descriptor(), &credential, Utc::now())
        .await?;

    if result.valid {
        println!("Credential is VALID");
    } else {
        println!("Credential is INVALID");
    }
    println!();
    println!("  Kind:    {}", kind);
    println!("  ID:      {}", credential.id);
    println!("  Issuer:  {}", credential.issuer.id);
    println!();
    for check in &result.checks {
        let icon = if check.passed { "PASS" } else { "FAIL" };
        print!("  [{}] {}", icon, check.name);
        if let Some(ref detail) = check.detail {
            print!(": {}", detail);
        }
        println!();
    }

    if !result.valid {
        anyhow::bail!("credential {} failed verification", credential.id);
    }
    Ok(())
}
