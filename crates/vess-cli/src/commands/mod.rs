pub mod digest;
pub mod init;
pub mod issue;
pub mod keygen;
pub mod verify;

use std::path::Path;

use vess_credentials::{split_credential_json, CredentialKind, VerifiableCredential};

/// Read a JSON argument given inline or as a path to a file.
pub fn read_json_arg(arg: &str) -> anyhow::Result<serde_json::Value> {
    let text = if Path::new(arg).exists() {
        std::fs::read_to_string(arg)?
    } else {
        arg.to_string()
    };
    serde_json::from_str(&text).map_err(|e| anyhow::anyhow!("invalid JSON: {}", e))
}

/// Parse a signed credential and resolve its kind, inferring it from the
/// `type` array when not given.
pub fn load_credential(
    arg: &str,
    kind: Option<CredentialKind>,
) -> anyhow::Result<(CredentialKind, VerifiableCredential<serde_json::Value>)> {
    let value = read_json_arg(arg)?;
    let (envelope, proof) = split_credential_json(&value)?;
    let kind = match kind {
        Some(kind) => kind,
        None => CredentialKind::from_credential_types(&envelope.types)?,
    };
    Ok((kind, VerifiableCredential { envelope, proof }))
}

/// Write `text` to `out`, or stdout when absent.
pub fn emit(text: &str, out: Option<&Path>) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, text)?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => println!("{}", text),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_json_inline_and_file() {
        let inline = read_json_arg(r#"{"a": 1}"#).unwrap();
        assert_eq!(inline["a"], 1);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subject.json");
        std::fs::write(&path, r#"{"b": 2}"#).unwrap();
        let from_file = read_json_arg(path.to_str().unwrap()).unwrap();
        assert_eq!(from_file["b"], 2);

        assert!(read_json_arg("not json").is_err());
    }

    #[test]
    fn test_load_credential_requires_proof() {
        let unsigned = r#"{"@context": [], "type": ["VerifiableCredential", "WorkCredential"]}"#;
        assert!(load_credential(unsigned, None).is_err());
    }
}
