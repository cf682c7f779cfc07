use once_cell::sync::Lazy;
use regex::Regex;

/// Longest address accepted, per RFC 5321 path limits.
pub const MAX_EMAIL_LENGTH: usize = 254;

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Validates an email address by shape (`local@domain.tld`) and length.
pub fn validate_email(email: &str) -> Option<String> {
    if email.is_empty() {
        return Some("Email is required".to_string());
    }
    if email.trim().is_empty() {
        return Some("Email cannot be empty".to_string());
    }
    if !EMAIL_SHAPE.is_match(email) {
        return Some("Please enter a valid email address".to_string());
    }
    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Some("Email address is too long".to_string());
    }
    None
}
