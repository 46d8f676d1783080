/**
 * Share Token Storage
 *
 * Resolves share tokens to source files. A token resolves only if it was
 * issued (listed in the shares manifest or minted with `issue`) and still
 * points at a regular file inside the storage root.
 *
 * # Manifest Format
 *
 * ```toml
 * [[share]]
 * token = "abc123"
 * path = "reports/report.docx"
 * ```
 */

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::backend::error::BackendError;

/// A source file a token resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute, canonical path of the file
    pub path: PathBuf,
    /// File name shown to the editor
    pub name: String,
}

impl SourceFile {
    /// Lowercased extension, if any
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Resolves share tokens to readable files
#[async_trait]
pub trait FileResolver: Send + Sync {
    /// Resolve a token to its file.
    ///
    /// `Ok(None)` means the token grants access to nothing; `Err` is reserved
    /// for storage failures.
    async fn resolve_file_for_token(
        &self,
        token: &str,
    ) -> Result<Option<SourceFile>, BackendError>;
}

#[derive(Debug, Deserialize)]
struct ShareManifest {
    #[serde(default)]
    share: Vec<ShareEntry>,
}

#[derive(Debug, Deserialize)]
struct ShareEntry {
    token: String,
    path: PathBuf,
}

/// Token → file registry rooted at a storage directory
#[derive(Debug, Clone)]
pub struct ShareRegistry {
    root: PathBuf,
    shares: Arc<RwLock<HashMap<String, PathBuf>>>,
}

impl ShareRegistry {
    /// Create an empty registry
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            shares: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a registry from a shares manifest body
    pub fn from_manifest(root: PathBuf, manifest: &str) -> Result<Self, BackendError> {
        let manifest: ShareManifest = toml::from_str(manifest).map_err(|e| {
            BackendError::state(format!("invalid shares manifest: {}", e))
        })?;

        let registry = Self::new(root);
        {
            let mut shares = registry.write_shares();
            for entry in manifest.share {
                if entry.token.trim().is_empty() {
                    tracing::warn!("[Storage] Skipping share with empty token");
                    continue;
                }
                shares.insert(entry.token, entry.path);
            }
            tracing::info!("[Storage] Loaded {} share tokens", shares.len());
        }
        Ok(registry)
    }

    /// Load a registry from a manifest file
    pub async fn load(root: PathBuf, manifest_path: &Path) -> Result<Self, BackendError> {
        let body = tokio::fs::read_to_string(manifest_path).await?;
        Self::from_manifest(root, &body)
    }

    /// Issue a new token for a path relative to the storage root
    ///
    /// Tokens are random UUIDs drawn from the OS generator.
    pub fn issue(&self, relative_path: impl Into<PathBuf>) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.write_shares().insert(token.clone(), relative_path.into());
        token
    }

    /// Withdraw a token
    pub fn revoke(&self, token: &str) -> bool {
        self.write_shares().remove(token).is_some()
    }

    pub fn len(&self) -> usize {
        self.read_shares().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_shares(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, PathBuf>> {
        self.shares.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_shares(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, PathBuf>> {
        self.shares.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Reject absolute paths and `..` before touching the filesystem
fn is_plain_relative(path: &Path) -> bool {
    path.components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

#[async_trait]
impl FileResolver for ShareRegistry {
    async fn resolve_file_for_token(
        &self,
        token: &str,
    ) -> Result<Option<SourceFile>, BackendError> {
        let entry = self.read_shares().get(token).cloned();
        let relative = match entry {
            Some(path) => path,
            None => {
                tracing::debug!("[Storage] Unknown share token");
                return Ok(None);
            }
        };

        if !is_plain_relative(&relative) {
            tracing::warn!("[Storage] Share path escapes storage root: {}", relative.display());
            return Ok(None);
        }

        let root = tokio::fs::canonicalize(&self.root).await?;
        let candidate = match tokio::fs::canonicalize(root.join(&relative)).await {
            Ok(path) => path,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("[Storage] Shared file is gone: {}", relative.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        // symlinks may still point outside the root
        if !candidate.starts_with(&root) {
            tracing::warn!("[Storage] Share resolves outside storage root: {}", relative.display());
            return Ok(None);
        }

        let metadata = tokio::fs::metadata(&candidate).await?;
        if !metadata.is_file() {
            return Ok(None);
        }

        let name = candidate
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Some(SourceFile {
            path: candidate,
            name,
        }))
    }
}
