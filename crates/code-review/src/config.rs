//! User configuration for code-review.
//!
//! Loads and saves `~/.code-review.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The config file name, relative to the home directory
pub const CONFIG_FILE_NAME: &str = ".code-review.toml";

/// Environment variable consulted when the config has no API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Settings saved by `code-review set`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// OpenAI-compatible endpoint, e.g. a proxy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
}

impl UserConfig {
    /// `~/.code-review.toml`
    pub fn default_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(CONFIG_FILE_NAME))
            .context("Failed to determine home directory")
    }

    /// Load from `path`; a missing file yields the defaults, a malformed one is an error
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Write to `path`, readable by the owner only
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
        }

        Ok(())
    }

    /// The configured key, else the environment's. Blank values count as unset.
    pub fn resolve_api_key(&self, from_env: Option<String>) -> Option<String> {
        self.openai_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| from_env.filter(|k| !k.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = UserConfig::load_from(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, UserConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let config = UserConfig {
            openai_api_key: Some("sk-test".into()),
            openai_model: Some("gpt-4o".into()),
            max_tokens: Some(2000),
            api_base_url: None,
        };

        config.save_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("openai_model = \"gpt-4o\""));
        assert!(!content.contains("api_base_url"));
        assert_eq!(UserConfig::load_from(&path).unwrap(), config);
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        UserConfig::default().save_to(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_unknown_field_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "openai_api_key = \"sk\"\ntemperature = 0.2\n").unwrap();

        let err = UserConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_resolve_api_key_prefers_config() {
        let config = UserConfig {
            openai_api_key: Some("from-config".into()),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_api_key(Some("from-env".into())).as_deref(),
            Some("from-config")
        );
    }

    #[test]
    fn test_resolve_api_key_falls_back_to_env() {
        let blank = UserConfig {
            openai_api_key: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(
            blank.resolve_api_key(Some("from-env".into())).as_deref(),
            Some("from-env")
        );
        assert_eq!(UserConfig::default().resolve_api_key(Some(String::new())), None);
        assert_eq!(UserConfig::default().resolve_api_key(None), None);
    }
}
