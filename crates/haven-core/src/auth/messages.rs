//! Mapping from raw provider messages to user-facing text.

use crate::error::{HavenError, ProviderError};

/// Fallback shown when the provider gave no message at all.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

const FRIENDLY_MESSAGES: &[(&str, &str)] = &[
    (
        "Invalid login credentials",
        "Invalid email or password. Please try again.",
    ),
    (
        "Email not confirmed",
        "Please check your email and confirm your account.",
    ),
    (
        "User already registered",
        "An account with this email already exists.",
    ),
    (
        "Password should be at least 6 characters",
        "Password must be at least 6 characters long.",
    ),
];

/// Maps a provider message to user-facing text.
///
/// Unknown messages pass through unchanged; an empty message becomes
/// [`UNEXPECTED_ERROR_MESSAGE`].
pub fn friendly_message(raw: &str) -> String {
    if let Some((_, friendly)) = FRIENDLY_MESSAGES.iter().find(|(key, _)| *key == raw) {
        return (*friendly).to_string();
    }
    if raw.trim().is_empty() {
        UNEXPECTED_ERROR_MESSAGE.to_string()
    } else {
        raw.to_string()
    }
}

impl ProviderError {
    /// Converts into an [`HavenError::Auth`] carrying the mapped message.
    pub fn into_auth_error(self) -> HavenError {
        HavenError::auth(friendly_message(&self.message))
    }
}
