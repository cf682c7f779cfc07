//! Password rules and advisory strength scoring.

use serde::Serialize;
use strum::Display;

/// Characters counted as "special" by both the rule and the strength meter.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

fn has_special(password: &str) -> bool {
    password.chars().any(|c| SPECIAL_CHARACTERS.contains(c))
}

fn has_uppercase(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_uppercase())
}

fn has_lowercase(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_lowercase())
}

fn has_digit(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_digit())
}

/// Configurable password requirements. Every class is required by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
        }
    }
}

impl PasswordPolicy {
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Length-only policy, no character classes.
    pub fn length_only(min_length: usize) -> Self {
        Self {
            min_length,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
            require_special: false,
        }
    }
}

/// Validates `password` against `policy`. The first failing rule wins.
pub fn validate_password(password: &str, policy: &PasswordPolicy) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.chars().count() < policy.min_length {
        return Some(format!(
            "Password must be at least {} characters long",
            policy.min_length
        ));
    }
    if policy.require_uppercase && !has_uppercase(password) {
        return Some("Password must contain at least one uppercase letter".to_string());
    }
    if policy.require_lowercase && !has_lowercase(password) {
        return Some("Password must contain at least one lowercase letter".to_string());
    }
    if policy.require_digit && !has_digit(password) {
        return Some("Password must contain at least one number".to_string());
    }
    if policy.require_special && !has_special(password) {
        return Some("Password must contain at least one special character".to_string());
    }
    None
}

pub fn validate_confirm_password(password: &str, confirm_password: &str) -> Option<String> {
    if confirm_password.is_empty() {
        return Some("Please confirm your password".to_string());
    }
    if password != confirm_password {
        return Some("Passwords do not match".to_string());
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StrengthLevel {
    Weak,
    Fair,
    Good,
    Strong,
}

impl StrengthLevel {
    fn from_score(score: u8) -> Self {
        match score {
            0 | 1 => StrengthLevel::Weak,
            2 => StrengthLevel::Fair,
            3 => StrengthLevel::Good,
            _ => StrengthLevel::Strong,
        }
    }
}

/// Advisory strength feedback. Not a gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    /// 0..=5
    pub score: u8,
    pub feedback: Vec<&'static str>,
    pub level: StrengthLevel,
}

pub fn password_strength(password: &str) -> PasswordStrength {
    let checks: [(bool, &'static str); 5] = [
        (password.chars().count() >= 8, "Use at least 8 characters"),
        (has_lowercase(password), "Add lowercase letters"),
        (has_uppercase(password), "Add uppercase letters"),
        (has_digit(password), "Add numbers"),
        (has_special(password), "Add special characters"),
    ];

    let mut score = 0u8;
    let mut feedback = Vec::new();
    for (passed, hint) in checks {
        if passed {
            score += 1;
        } else {
            feedback.push(hint);
        }
    }

    PasswordStrength {
        score,
        feedback,
        level: StrengthLevel::from_score(score),
    }
}
