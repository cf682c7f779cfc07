//! Local secure key-value storage trait.
//!
//! Holds the provider's persisted session and any locally cached user data.

use crate::error::Result;

/// Key under which the backend client persists its session blob.
pub const AUTH_SESSION_KEY: &str = "haven.auth.session";

/// Keys holding locally cached user data.
pub const USER_SESSION_CACHE_KEY: &str = "userSession";
pub const USER_PROFILE_CACHE_KEY: &str = "userProfile";

/// Every key that must be gone once the user signs out.
pub const SIGN_OUT_KEYS: &[&str] = &[
    AUTH_SESSION_KEY,
    USER_SESSION_CACHE_KEY,
    USER_PROFILE_CACHE_KEY,
];

/// Service for storing small secrets such as session tokens.
///
/// # Security Note
///
/// Implementations should ensure that:
/// - Stored values are readable only by the current user (e.g., 600 on Unix)
/// - Values are never logged or exposed in error messages
#[async_trait::async_trait]
pub trait SecureStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes all given keys. Missing keys are not an error.
    async fn remove_many(&self, keys: &[&str]) -> Result<()>;
}
