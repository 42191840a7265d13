//! On-disk access token storage.
//!
//! The backend's session cookie lives for one day, so a stored token is
//! treated as expired after the same period.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifetime of a stored token, in hours.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Clone, Serialize, Deserialize)]
pub struct StoredCredential {
    pub base_url: String,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredential")
            .field("base_url", &self.base_url)
            .field("access_token", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl StoredCredential {
    pub fn issued_at(base_url: &str, access_token: &str, now: DateTime<Utc>) -> Self {
        Self {
            base_url: base_url.to_string(),
            access_token: access_token.to_string(),
            expires_at: now + Duration::hours(TOKEN_LIFETIME_HOURS),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// A JSON credential file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, credential: &StoredCredential) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(credential)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write credentials: {}", self.path.display()))?;
        restrict_permissions(&self.path)?;
        tracing::debug!(path = %self.path.display(), "stored access token");
        Ok(())
    }

    /// The stored credential for `base_url`, if present and still valid at `now`.
    pub fn load_valid(&self, base_url: &str, now: DateTime<Utc>) -> Result<Option<StoredCredential>> {
        let Some(credential) = self.load()? else {
            return Ok(None);
        };
        if credential.base_url != base_url {
            tracing::debug!(stored = %credential.base_url, "credential belongs to another backend");
            return Ok(None);
        }
        if credential.is_expired(now) {
            tracing::info!("stored access token has expired, please log in again");
            return Ok(None);
        }
        Ok(Some(credential))
    }

    pub fn load(&self) -> Result<Option<StoredCredential>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read credentials: {}", self.path.display()))?;
        let credential = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse credentials: {}", self.path.display()))?;
        Ok(Some(credential))
    }

    /// Remove the stored credential. Returns whether one existed.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e)
                .with_context(|| format!("failed to remove credentials: {}", self.path.display())),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
