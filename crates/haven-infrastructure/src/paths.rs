//! Unified path management for haven configuration files.
//!
//! This ensures consistency across all platforms (Linux, macOS, Windows).

use haven_core::error::HavenError;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "haven";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for HavenError {
    fn from(e: PathError) -> Self {
        HavenError::config(e.to_string())
    }
}

/// Unified path management for haven.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/haven/             # Config directory (platform default)
/// ├── config.toml              # Application configuration
/// └── secure_storage.json      # Persisted auth session and cached user data
/// ```
///
/// A base directory replaces the platform default, which keeps tests
/// away from the real home directory.
#[derive(Debug, Clone, Default)]
pub struct HavenPaths {
    base: Option<PathBuf>,
}

impl HavenPaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the haven configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    /// Returns the path to the main configuration file.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secure storage file.
    ///
    /// # Security Note
    ///
    /// The file holds refresh tokens; it is written with 600 permissions on Unix.
    pub fn secure_storage_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("secure_storage.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_dir_override() {
        let paths = HavenPaths::new(Some(Path::new("/tmp/haven-test")));
        assert_eq!(paths.config_dir().unwrap(), PathBuf::from("/tmp/haven-test"));
        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/tmp/haven-test/config.toml")
        );
        assert_eq!(
            paths.secure_storage_file().unwrap(),
            PathBuf::from("/tmp/haven-test/secure_storage.json")
        );
    }

    #[test]
    fn test_default_config_dir() {
        // Skipped on hosts without a resolvable config directory.
        if let Ok(config_dir) = HavenPaths::default().config_dir() {
            assert!(config_dir.ends_with("haven"));
            let config_file = HavenPaths::default().config_file().unwrap();
            assert!(config_file.starts_with(&config_dir));
        }
    }
}
