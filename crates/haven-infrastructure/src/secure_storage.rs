//! Secure key-value storage implementations.
//!
//! `FileSecureStorage` keeps a flat JSON object in
//! ~/.config/haven/secure_storage.json; `MemorySecureStorage` keeps nothing
//! across runs and backs `persist_session = false`.

use async_trait::async_trait;
use haven_core::error::Result;
use haven_core::storage::SecureStorage;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::paths::HavenPaths;

type Entries = BTreeMap<String, String>;

/// File-backed secure storage.
///
/// # Security Note
///
/// Values are plaintext JSON. The file is written with 600 permissions on
/// Unix so only the current user can read the stored tokens.
pub struct FileSecureStorage {
    path: PathBuf,
    /// Serializes read-modify-write cycles on the file.
    lock: Mutex<()>,
}

impl FileSecureStorage {
    /// Creates storage at the default path.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(HavenPaths::default().secure_storage_file()?))
    }

    /// Creates storage at a custom path (for testing).
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Entries> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Entries::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_entries(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, json).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&self.path, permissions).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SecureStorage for FileSecureStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        let before = entries.len();
        for key in keys {
            entries.remove(*key);
        }
        if entries.len() == before {
            return Ok(());
        }
        tracing::debug!(
            "[SecureStorage] Removed {} keys",
            before - entries.len()
        );
        self.write_entries(&entries).await
    }
}

/// Process-local storage; nothing survives a restart.
#[derive(Default)]
pub struct MemorySecureStorage {
    entries: Mutex<Entries>,
}

impl MemorySecureStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecureStorage for MemorySecureStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut entries = self.entries.lock().await;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}
