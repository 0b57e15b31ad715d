use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Client settings, usually loaded from a TOML file.
///
/// ```toml
/// cache_capacity = 100
/// cache_ttl_secs = 300
/// git_binary = "/usr/bin/git"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Maximum number of cached remote listings.
    pub cache_capacity: usize,
    /// How long a cached listing stays valid.
    pub cache_ttl_secs: u64,
    /// Explicit `git` executable; `PATH` is searched when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_binary: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cache_capacity: gitpkg_refs::DEFAULT_CAPACITY,
            cache_ttl_secs: gitpkg_refs::DEFAULT_TTL.as_secs(),
            git_binary: None,
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        debug!(path = %path.display(), ?config, "loaded client config");
        Ok(config)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Whether this config uses the process-wide resolver state.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    fn validate(&self) -> ConfigResult<()> {
        if let Some(binary) = &self.git_binary {
            if binary.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("git_binary must not be empty".into()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ClientConfig::default();
        assert_eq!(c.cache_capacity, 100);
        assert_eq!(c.cache_ttl(), Duration::from_secs(300));
        assert!(c.git_binary.is_none());
        assert!(c.is_default());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ClientConfig::from_toml_str("cache_ttl_secs = 30\n").unwrap();
        assert_eq!(c.cache_capacity, 100);
        assert_eq!(c.cache_ttl_secs, 30);
        assert!(!c.is_default());
    }

    #[test]
    fn full_toml() {
        let c = ClientConfig::from_toml_str(
            "cache_capacity = 5\ncache_ttl_secs = 1\ngit_binary = \"/opt/git/bin/git\"\n",
        )
        .unwrap();
        assert_eq!(c.cache_capacity, 5);
        assert_eq!(c.git_binary.as_deref(), Some(Path::new("/opt/git/bin/git")));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            ClientConfig::from_toml_str("cache_capacity = \"lots\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ClientConfig::from_toml_str("git_binary = \"\""),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn load_missing_file() {
        let err = ClientConfig::load("/nonexistent/gitpkg.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/gitpkg.toml"));
    }

    #[test]
    fn serializes_back_to_toml() {
        let text = toml::to_string(&ClientConfig::default()).unwrap();
        assert!(text.contains("cache_capacity = 100"));
        assert!(!text.contains("git_binary"));
    }
}
