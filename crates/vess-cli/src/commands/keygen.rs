//! `vess keygen`: Generate a new issuer key.

use clap::Args;
use std::io::Write;
use std::path::{Path, PathBuf};

use vess_core::Did;
use vess_crypto::KeyPair;

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Write the private key (hex) to this file instead of printing it.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &KeygenArgs) -> anyhow::Result<()> {
    let keypair = KeyPair::generate();
    let address = keypair.address();
    let did = Did::from_address(&address)?;

    println!("Address: {}", address);
    println!("DID:     {}", did);
    match &args.out {
        Some(path) => {
            write_secret(path, keypair.secret_hex().as_bytes())?;
            println!("Key:     written to {}", path.display());
        }
        None => println!("Key:     {}", keypair.secret_hex()),
    }
    Ok(())
}

/// Write key material readable by the owner only. An existing file is
/// truncated; on unix its mode is left as is.
fn write_secret(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_secret_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issuer.key");
        write_secret(&path, b"first-longer-value").unwrap();
        write_secret(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_secret_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issuer.key");
        write_secret(&path, b"00").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
