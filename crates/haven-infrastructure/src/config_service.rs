//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the root configuration
//! from the configuration file (~/.config/haven/config.toml), with backend
//! settings overridable from the environment.

use crate::paths::HavenPaths;
use haven_core::config::RootConfig;
use haven_core::error::{HavenError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Overrides `backend.url`.
pub const BACKEND_URL_ENV: &str = "HAVEN_BACKEND_URL";
/// Overrides `backend.anon_key`.
pub const ANON_KEY_ENV: &str = "HAVEN_ANON_KEY";

/// Configuration service that loads and caches the root configuration.
///
/// This implementation reads the configuration from config.toml
/// and caches it to avoid repeated file I/O operations.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
    /// Cached configuration loaded from file.
    /// Uses RwLock for thread-safe lazy loading.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Creates a ConfigService for the platform config file.
    ///
    /// The configuration is loaded lazily on first access.
    pub fn new() -> Self {
        let path = HavenPaths::default().config_file().ok();
        if path.is_none() {
            tracing::warn!("[ConfigService] No config directory; using defaults");
        }
        Self::from_path(path)
    }

    /// Creates a ConfigService reading a specific file (for testing).
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self::from_path(Some(path.as_ref().to_path_buf()))
    }

    fn from_path(path: Option<PathBuf>) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Gets the root configuration, loading from file if not cached.
    ///
    /// An unreadable file falls back to defaults; environment overrides
    /// apply either way.
    pub fn get_config(&self) -> RootConfig {
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let mut loaded = self.load().unwrap_or_else(|e| {
            tracing::warn!("[ConfigService] Failed to load config, using defaults: {}", e);
            RootConfig::default()
        });
        apply_env_overrides(&mut loaded, |key| std::env::var(key).ok());

        {
            let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = None;
    }

    /// Reads config.toml without environment overrides.
    ///
    /// A missing file yields the defaults.
    pub fn load(&self) -> Result<RootConfig> {
        let Some(path) = &self.path else {
            return Ok(RootConfig::default());
        };
        if !path.exists() {
            tracing::debug!("[ConfigService] {} not found, using defaults", path.display());
            return Ok(RootConfig::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Writes `config` to config.toml and drops the cache.
    pub fn save(&self, config: &RootConfig) -> Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| HavenError::config("No config file location"))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(config)?)?;
        tracing::info!("[ConfigService] Saved {}", path.display());
        self.invalidate_cache();
        Ok(())
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies non-empty environment values over the file configuration.
fn apply_env_overrides(config: &mut RootConfig, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    if let Some(url) = non_empty(BACKEND_URL_ENV) {
        config.backend.url = url;
    }
    if let Some(anon_key) = non_empty(ANON_KEY_ENV) {
        config.backend.anon_key = anon_key;
    }
}
