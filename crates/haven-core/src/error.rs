//! Error types for the Haven application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Haven application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HavenError {
    /// Credential rejected, confirmation pending, or the auth call failed.
    ///
    /// `reason` is already user-displayable.
    #[error("{reason}")]
    Auth { reason: String },

    /// The operation requires an authenticated session but none is present.
    #[error("No authenticated user")]
    NoSession,

    /// Reading the profile row failed. Non-fatal: the cached profile is kept.
    #[error("Failed to fetch profile: {0}")]
    ProfileFetch(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Transport-level failure talking to the hosted backend
    #[error("Network error: {0}")]
    Network(String),

    /// Local secure storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The device dialer could not be launched
    #[error("Dialer error: {0}")]
    Dialer(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HavenError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an Auth error with a user-displayable reason
    pub fn auth(reason: impl Into<String>) -> Self {
        Self::Auth {
            reason: reason.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an Auth error
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Check if this is a NoSession error
    pub fn is_no_session(&self) -> bool {
        matches!(self, Self::NoSession)
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the user-facing reason of an Auth error.
    pub fn auth_reason(&self) -> Option<&str> {
        match self {
            Self::Auth { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Failure reported by the remote auth/database provider.
///
/// Carries the raw provider message. The session layer maps it to
/// user-facing text via [`crate::auth::friendly_message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
    /// HTTP status when the failure came from a response, `None` for transport failures.
    pub status: Option<u16>,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for HavenError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for HavenError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for HavenError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for HavenError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Provider failures outside the auth flow surface as network errors.
impl From<ProviderError> for HavenError {
    fn from(err: ProviderError) -> Self {
        Self::Network(err.message)
    }
}

impl From<anyhow::Error> for HavenError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, HavenError>`.
pub type Result<T> = std::result::Result<T, HavenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_displays_reason_only() {
        let err = HavenError::auth("Invalid email or password. Please try again.");
        assert_eq!(
            err.to_string(),
            "Invalid email or password. Please try again."
        );
        assert!(err.is_auth());
        assert_eq!(
            err.auth_reason(),
            Some("Invalid email or password. Please try again.")
        );
    }

    #[test]
    fn test_no_session_message() {
        assert_eq!(HavenError::NoSession.to_string(), "No authenticated user");
        assert!(HavenError::NoSession.is_no_session());
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: HavenError = io.into();
        assert!(matches!(err, HavenError::Storage(ref m) if m.contains("PermissionDenied")));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err: HavenError = json_err.into();
        assert!(matches!(err, HavenError::Serialization { ref format, .. } if format == "JSON"));
    }

    #[test]
    fn test_provider_error_into_network() {
        let err: HavenError = ProviderError::with_status("boom", 500).into();
        assert_eq!(err, HavenError::Network("boom".to_string()));
    }
}
