//! Engine configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CoreError;

/// The 20-byte zero address used as `verifyingContract` until a real
/// contract is deployed.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Full configuration for the credential engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// EIP-712 domain parameters.
    #[serde(default)]
    pub eip712: Eip712Config,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Domain parameters shared by every credential kind. Only the domain
/// `name` varies per kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Eip712Config {
    /// Domain version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Chain id bound into the domain separator.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Verifying contract address.
    #[serde(default = "default_verifying_contract")]
    pub verifying_contract: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_version() -> String {
    "1".into()
}
fn default_chain_id() -> u64 {
    1
}
fn default_verifying_contract() -> String {
    ZERO_ADDRESS.into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for Eip712Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            chain_id: default_chain_id(),
            verifying_contract: default_verifying_contract(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl EngineConfig {
    /// Load config from a TOML file, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.eip712.version, "1");
        assert_eq!(config.eip712.chain_id, 1);
        assert_eq!(config.eip712.verifying_contract, ZERO_ADDRESS);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn test_config_from_toml_partial() {
        let toml_str = r#"
[eip712]
verifying_contract = "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
"#;
        let config: EngineConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(
            config.eip712.verifying_contract,
            "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
        );
        // Defaults for unspecified
        assert_eq!(config.eip712.chain_id, 1);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_load_nonexistent_uses_defaults() {
        let config = EngineConfig::load(Path::new("/nonexistent/vess.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vess.toml");
        let config = EngineConfig {
            logging: LoggingConfig {
                level: "debug".into(),
                format: "json".into(),
            },
            ..Default::default()
        };
        config.save(&path).unwrap();
        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vess.toml");
        std::fs::write(&path, "[eip712\nchain_id = ").unwrap();
        assert!(matches!(
            EngineConfig::load(&path),
            Err(CoreError::ConfigParse(_))
        ));
    }
}
