//! Name and age rules.

use once_cell::sync::Lazy;
use regex::Regex;
use std::num::IntErrorKind;

pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MIN_AGE: i64 = 13;
pub const MAX_AGE: i64 = 120;

static NAME_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s\-']+$").expect("name pattern is valid"));

/// Validates a person name; `field_name` labels the messages (e.g. "Full name").
pub fn validate_name(name: &str, field_name: &str) -> Option<String> {
    if name.is_empty() {
        return Some(format!("{} is required", field_name));
    }
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Some(format!("{} cannot be empty", field_name));
    }
    let length = trimmed.chars().count();
    if length < MIN_NAME_LENGTH {
        return Some(format!(
            "{} must be at least {} characters long",
            field_name, MIN_NAME_LENGTH
        ));
    }
    if length > MAX_NAME_LENGTH {
        return Some(format!(
            "{} is too long (maximum {} characters)",
            field_name, MAX_NAME_LENGTH
        ));
    }
    if !NAME_CHARSET.is_match(name) {
        return Some(format!(
            "{} can only contain letters, spaces, hyphens, and apostrophes",
            field_name
        ));
    }
    None
}

/// Validates an age typed into a form.
pub fn validate_age(age: &str) -> Option<String> {
    let age = age.trim();
    if age.is_empty() {
        return Some("Age is required".to_string());
    }
    match age.parse::<i64>() {
        Ok(value) => validate_age_value(value),
        // Numeric but out of range for i64.
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => validate_age_value(i64::MAX),
        Err(e) if *e.kind() == IntErrorKind::NegOverflow => validate_age_value(i64::MIN),
        Err(_) => Some("Age must be a valid number".to_string()),
    }
}

pub fn validate_age_value(age: i64) -> Option<String> {
    if age < MIN_AGE {
        return Some(format!(
            "You must be at least {} years old to use this app",
            MIN_AGE
        ));
    }
    if age > MAX_AGE {
        return Some("Please enter a valid age".to_string());
    }
    None
}
