//! Persistent cache storage implementations

use super::types::CacheKey;
use crate::error::{FreebotsError, FreebotsResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

const TOKEN_EXTENSION: &str = "xml.gz";
const TEMP_EXTENSION: &str = "tmp";

/// Durable key-value store for compressed tokens
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Get the token stored for a key
    async fn get(&self, key: &CacheKey) -> FreebotsResult<Option<Vec<u8>>>;

    /// Store a token, replacing any previous one
    async fn set(&self, key: &CacheKey, token: Vec<u8>) -> FreebotsResult<()>;

    /// Remove a token
    async fn remove(&self, key: &CacheKey) -> FreebotsResult<()>;

    /// Remove every token
    async fn clear(&self) -> FreebotsResult<()>;

    /// Number of stored tokens
    async fn len(&self) -> FreebotsResult<usize>;
}

/// Disk-based persistent store, one file per key
#[derive(Debug, Clone)]
pub struct DiskStore {
    /// Base directory for token files
    base_dir: PathBuf,
}

impl DiskStore {
    /// Create a disk store rooted at `base_dir`, creating the directory if needed
    pub fn new(base_dir: impl AsRef<Path>) -> FreebotsResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();

        if !base_dir.exists() {
            std::fs::create_dir_all(&base_dir).map_err(|e| {
                FreebotsError::io_with_path(
                    format!("Failed to create cache directory: {}", e),
                    base_dir.display().to_string(),
                )
            })?;
        }

        Ok(Self { base_dir })
    }

    /// Directory holding the token files
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// File path for a cache key
    ///
    /// Keys are hashed so arbitrary storage paths map to flat, safe file names.
    pub fn file_path(&self, key: &CacheKey) -> PathBuf {
        let digest = Sha256::digest(key.persistent_key().as_bytes());
        let mut name = String::with_capacity(digest.len() * 2 + TOKEN_EXTENSION.len() + 1);
        for byte in digest {
            let _ = write!(name, "{:02x}", byte);
        }
        name.push('.');
        name.push_str(TOKEN_EXTENSION);
        self.base_dir.join(name)
    }

    fn is_token_file(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.ends_with(TOKEN_EXTENSION))
            .unwrap_or(false)
    }

    fn is_temp_file(path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(TEMP_EXTENSION)
    }

    async fn token_files(&self) -> FreebotsResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut entries = match fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(files),
            Err(e) => {
                return Err(FreebotsError::storage(format!(
                    "Failed to read cache directory: {}",
                    e
                )));
            }
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| FreebotsError::storage(format!("Failed to read directory entry: {}", e)))?
        {
            let path = entry.path();
            if Self::is_token_file(&path) || Self::is_temp_file(&path) {
                files.push(path);
            }
        }

        Ok(files)
    }
}

#[async_trait]
impl PersistentStore for DiskStore {
    async fn get(&self, key: &CacheKey) -> FreebotsResult<Option<Vec<u8>>> {
        let path = self.file_path(key);
        match fs::read(&path).await {
            Ok(token) => Ok(Some(token)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FreebotsError::storage_with_context(
                format!("Failed to read cache file: {}", e),
                path.display().to_string(),
            )),
        }
    }

    async fn set(&self, key: &CacheKey, token: Vec<u8>) -> FreebotsResult<()> {
        let path = self.file_path(key);
        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| FreebotsError::storage(format!("Failed to create cache directory: {}", e)))?;

        // Write-then-rename so readers never see a truncated token
        let temp_path = path.with_extension(format!("{}.{}", uuid::Uuid::new_v4(), TEMP_EXTENSION));
        fs::write(&temp_path, &token)
            .await
            .map_err(|e| FreebotsError::storage(format!("Failed to write cache file: {}", e)))?;

        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(FreebotsError::storage(format!(
                "Failed to move cache file into place: {}",
                e
            )));
        }

        debug!(key = %key, bytes = token.len(), "persisted compressed xml");
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> FreebotsResult<()> {
        match fs::remove_file(self.file_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FreebotsError::storage(format!(
                "Failed to remove cache file: {}",
                e
            ))),
        }
    }

    async fn clear(&self) -> FreebotsResult<()> {
        for path in self.token_files().await? {
            let _ = fs::remove_file(&path).await;
        }
        Ok(())
    }

    async fn len(&self) -> FreebotsResult<usize> {
        Ok(self
            .token_files()
            .await?
            .iter()
            .filter(|path| Self::is_token_file(path))
            .count())
    }
}

/// Non-durable persistent store kept in memory
///
/// Stands in for the disk when persistence is disabled, and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tokens: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the raw token for a key
    pub fn insert_raw(&self, key: &CacheKey, token: Vec<u8>) {
        self.tokens.lock().insert(key.persistent_key(), token);
    }

    /// Raw token for a key
    pub fn get_raw(&self, key: &CacheKey) -> Option<Vec<u8>> {
        self.tokens.lock().get(&key.persistent_key()).cloned()
    }
}

#[async_trait]
impl PersistentStore for MemoryStore {
    async fn get(&self, key: &CacheKey) -> FreebotsResult<Option<Vec<u8>>> {
        Ok(self.get_raw(key))
    }

    async fn set(&self, key: &CacheKey, token: Vec<u8>) -> FreebotsResult<()> {
        self.insert_raw(key, token);
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> FreebotsResult<()> {
        self.tokens.lock().remove(&key.persistent_key());
        Ok(())
    }

    async fn clear(&self) -> FreebotsResult<()> {
        self.tokens.lock().clear();
        Ok(())
    }

    async fn len(&self) -> FreebotsResult<usize> {
        Ok(self.tokens.lock().len())
    }
}
