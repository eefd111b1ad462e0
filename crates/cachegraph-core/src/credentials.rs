//! Local JSON store for provider API keys and the deploy-target endpoint.
//!
//! The file is written with owner-only permissions. Failures are reported to
//! callers as [`StoreOutcome`] values rather than errors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
enum CredentialError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed credentials file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of a store operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StoreOutcome {
    fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialFile {
    #[serde(default)]
    api_keys: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
}

pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.cachegraph/credentials.json`
    pub fn default_location() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".cachegraph").join("credentials.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn api_key(&self, provider: &str) -> Option<String> {
        self.read_logged()?.api_keys.get(provider).cloned()
    }

    pub fn set_api_key(&self, provider: &str, key: &str) -> StoreOutcome {
        if key.trim().is_empty() {
            return StoreOutcome::failed(format!("API key for {} is empty", provider));
        }
        self.update(|file| {
            file.api_keys
                .insert(provider.to_string(), key.trim().to_string());
        })
    }

    pub fn remove_api_key(&self, provider: &str) -> StoreOutcome {
        self.update(|file| {
            file.api_keys.remove(provider);
        })
    }

    /// Providers with a stored key, sorted by name.
    pub fn configured_providers(&self) -> Vec<String> {
        self.read_logged()
            .map(|file| file.api_keys.into_keys().collect())
            .unwrap_or_default()
    }

    pub fn endpoint(&self) -> Option<String> {
        self.read_logged()?.endpoint
    }

    pub fn set_endpoint(&self, endpoint: &str) -> StoreOutcome {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return StoreOutcome::failed(format!("Not an http(s) URL: {}", endpoint));
        }
        self.update(|file| file.endpoint = Some(endpoint.to_string()))
    }

    fn update(&self, apply: impl FnOnce(&mut CredentialFile)) -> StoreOutcome {
        let result = self.read().and_then(|mut file| {
            apply(&mut file);
            self.write(&file)
        });
        match result {
            Ok(()) => StoreOutcome::ok(),
            Err(e) => {
                warn!("Failed to update {}: {}", self.path.display(), e);
                StoreOutcome::failed(e.to_string())
            }
        }
    }

    fn read_logged(&self) -> Option<CredentialFile> {
        match self.read() {
            Ok(file) => Some(file),
            Err(e) => {
                warn!("Failed to read {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// A missing file reads as empty.
    fn read(&self) -> Result<CredentialFile, CredentialError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CredentialFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, file: &CredentialFile) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(file)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut handle = options.open(&self.path)?;
        // The create mode does not apply to a file that already exists.
        restrict_permissions(&self.path)?;
        handle.write_all(content.as_bytes())?;
        debug!("Wrote credentials to {}", self.path.display());
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
