//! Client configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_TIMEOUT_SECS;

/// Top-level proctor configuration.
///
/// Note: Custom Debug impl masks the token to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProctorConfig {
    /// Root URL of the exam backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Where `proctor login` stores the access token.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
    /// Rows per page for list commands.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Access token that takes precedence over the stored credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl std::fmt::Debug for ProctorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProctorConfig")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("credentials_path", &self.credentials_path)
            .field("page_size", &self.page_size)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_page_size() -> u32 {
    10
}

impl Default for ProctorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            credentials_path: None,
            page_size: default_page_size(),
            token: None,
        }
    }
}

impl ProctorConfig {
    /// Credential file location, defaulting to the per-user config directory.
    pub fn credentials_file(&self) -> PathBuf {
        self.credentials_path
            .clone()
            .or_else(|| config_dir().map(|d| d.join("credentials.json")))
            .unwrap_or_else(|| PathBuf::from(".proctor-credentials.json"))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `proctor.toml` in the current directory
/// 2. `~/.config/proctor/config.toml`
///
/// Environment variable overrides: `PROCTOR_BASE_URL`, `PROCTOR_TOKEN`.
pub fn load_config() -> Result<ProctorConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ProctorConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("proctor.toml");
        if local.exists() {
            Some(local)
        } else {
            config_dir()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ProctorConfig::default(),
    };

    if let Ok(url) = std::env::var("PROCTOR_BASE_URL") {
        config.base_url = url;
    }
    if let Ok(token) = std::env::var("PROCTOR_TOKEN") {
        config.token = Some(token);
    }

    config.base_url = resolve_env_vars(&config.base_url);
    config.token = config
        .token
        .as_deref()
        .map(resolve_env_vars)
        .filter(|t| !t.is_empty());

    Ok(config)
}

fn parse_config(content: &str) -> Result<ProctorConfig> {
    Ok(toml::from_str::<ProctorConfig>(content)?)
}

/// `~/.config/proctor`, when `HOME` is set.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("proctor"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_PROCTOR_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_PROCTOR_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("https://${_PROCTOR_TEST_VAR}.example.com"),
            "https://hello.example.com"
        );
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_PROCTOR_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = ProctorConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.page_size, 10);
        assert!(config.token.is_none());
    }

    #[test]
    fn parse_partial_config() {
        let config = parse_config(
            r#"
base_url = "https://exams.example.com/api"
page_size = 25
"#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://exams.example.com/api");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proctor.toml");
        std::fs::write(
            &path,
            "timeout_secs = 5\ncredentials_path = \"/tmp/creds.json\"\n",
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.credentials_file(), PathBuf::from("/tmp/creds.json"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/proctor.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn debug_masks_token() {
        let config = ProctorConfig {
            token: Some("eyJhbGciOi".into()),
            ..Default::default()
        };
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("eyJhbGciOi"));
        assert!(dbg.contains("***"));
    }
}
