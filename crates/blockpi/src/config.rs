//! Harness configuration

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use crate::error::{HarnessError, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "BLOCKPI_CONFIG";

/// Upper bound on virtual users; each one is an OS thread
pub const MAX_VUS: u64 = 100_000;

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Number of concurrent virtual users
    pub vus: u64,

    /// Iterations per virtual user
    pub iterations: u64,

    /// Counters every virtual user declares during init
    pub counters: Vec<String>,

    /// Message each iteration signs
    pub message: String,

    /// Environment variable holding the signing key (hex)
    pub private_key_env: String,

    /// Recover the signer after every signature and count mismatches
    pub verify_signatures: bool,

    /// tracing filter directive used when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            vus: 4,
            iterations: 1000,
            counters: vec!["iterations".to_string()],
            message: "hello".to_string(),
            private_key_env: "BLOCKPI_PRIVATE_KEY".to_string(),
            verify_signatures: false,
            log_filter: "blockpi=info,blockpi_core=info".to_string(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Resolve the config for a run
    ///
    /// An explicitly named file must exist. Without one, `$BLOCKPI_CONFIG`
    /// is used when it points at an existing file, else the defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let from_env = std::env::var_os(CONFIG_ENV).map(std::path::PathBuf::from);
                Self::load_or_default(from_env.as_deref())
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.vus == 0 {
            return Err(HarnessError::Config("vus must be at least 1".to_string()));
        }
        if self.vus > MAX_VUS {
            return Err(HarnessError::Config(format!(
                "vus must be at most {MAX_VUS}, got {}",
                self.vus
            )));
        }
        if self.private_key_env.is_empty() {
            return Err(HarnessError::Config(
                "private_key_env must not be empty".to_string(),
            ));
        }
        if let Some(empty) = self.counters.iter().position(|name| name.is_empty()) {
            return Err(HarnessError::Config(format!(
                "counter name at index {empty} is empty"
            )));
        }
        Ok(())
    }

    /// Key given on the command line, `-` for `input`, or the configured env var
    pub fn resolve_private_key(&self, arg: Option<&str>, input: impl Read) -> Result<String> {
        match arg {
            Some("-") => {
                let key = std::io::read_to_string(input)?;
                let key = key.trim();
                if key.is_empty() {
                    return Err(HarnessError::Config("no key on stdin".to_string()));
                }
                Ok(key.to_string())
            }
            Some(key) => Ok(key.to_string()),
            None => self.private_key(),
        }
    }

    /// Read the signing key from the configured environment variable
    pub fn private_key(&self) -> Result<String> {
        std::env::var(&self.private_key_env).map_err(|_| {
            HarnessError::Config(format!(
                "environment variable {} is not set",
                self.private_key_env
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        HarnessConfig::default().validate().unwrap();
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("blockpi.json");

        let config = HarnessConfig {
            vus: 16,
            counters: vec!["tx_sent".to_string()],
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = HarnessConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blockpi.json");
        std::fs::write(&path, r#"{ "vus": 2 }"#).unwrap();

        let loaded = HarnessConfig::load(&path).unwrap();
        assert_eq!(loaded.vus, 2);
        assert_eq!(loaded.iterations, HarnessConfig::default().iterations);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let loaded = HarnessConfig::load_or_default(Some(path.as_path())).unwrap();
        assert_eq!(loaded, HarnessConfig::default());
    }

    #[test]
    fn test_zero_vus_rejected() {
        let config = HarnessConfig {
            vus: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(HarnessError::Config(_))));
    }

    #[test]
    fn test_huge_vus_rejected() {
        for vus in [MAX_VUS + 1, u64::MAX] {
            let config = HarnessConfig {
                vus,
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(HarnessError::Config(_))));
        }
        let config = HarnessConfig {
            vus: MAX_VUS,
            ..Default::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(
            HarnessConfig::resolve(Some(path.as_path())),
            Err(HarnessError::Io(_))
        ));
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blockpi.json");
        std::fs::write(&path, r#"{ "iterations": 7 }"#).unwrap();
        let loaded = HarnessConfig::resolve(Some(path.as_path())).unwrap();
        assert_eq!(loaded.iterations, 7);
    }

    #[test]
    fn test_key_from_stdin_is_trimmed() {
        let config = HarnessConfig::default();
        let input = std::io::Cursor::new("  0xabc123\n");
        assert_eq!(
            config.resolve_private_key(Some("-"), input).unwrap(),
            "0xabc123"
        );
    }

    #[test]
    fn test_empty_stdin_key_rejected() {
        let config = HarnessConfig::default();
        let input = std::io::Cursor::new("\n");
        assert!(matches!(
            config.resolve_private_key(Some("-"), input),
            Err(HarnessError::Config(_))
        ));
    }

    #[test]
    fn test_literal_key_passes_through() {
        let config = HarnessConfig::default();
        let input = std::io::Cursor::new("ignored");
        assert_eq!(
            config.resolve_private_key(Some("deadbeef"), input).unwrap(),
            "deadbeef"
        );
    }

    #[test]
    fn test_missing_env_key() {
        let config = HarnessConfig {
            private_key_env: "BLOCKPI_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.resolve_private_key(None, std::io::empty()),
            Err(HarnessError::Config(_))
        ));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blockpi.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            HarnessConfig::load(&path),
            Err(HarnessError::Serialization(_))
        ));
    }
}
