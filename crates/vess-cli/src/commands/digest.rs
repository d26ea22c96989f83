//! `vess digest`: Show the EIP-712 digest a credential was signed over.

use clap::Args;

use vess_core::EngineConfig;
use vess_credentials::{digest_for, CredentialKind};

use super::load_credential;

#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Credential JSON (as string or path to file).
    pub credential: String,

    /// Credential kind. Inferred from the `type` array when omitted.
    #[arg(short, long)]
    pub kind: Option<CredentialKind>,

    /// Print only the typed data JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &DigestArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let (kind, credential) = load_credential(&args.credential, args.kind)?;
    let digest = digest_for(kind.descriptor(), &credential.envelope, &config.eip712)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&digest)?);
        return Ok(());
    }

    println!("Domain:            {}", digest.domain.name);
    println!("Primary type:      {}", digest.primary_type);
    println!(
        "Encoded type:      {}",
        digest.types.encode_type(&digest.primary_type)?
    );
    println!(
        "Domain separator:  0x{}",
        hex::encode(digest.domain_separator()?)
    );
    println!("Message hash:      0x{}", hex::encode(digest.message_hash()?));
    println!("Signing hash:      0x{}", hex::encode(digest.signing_hash()?));
    Ok(())
}
