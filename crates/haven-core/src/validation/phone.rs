use once_cell::sync::Lazy;
use regex::Regex;

// International (60...), local (0...) and bare forms. Ambiguous on purpose:
// the stored value is never normalized.
static MALAYSIAN_PHONE_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [r"^60\d{9,10}$", r"^0\d{9,10}$", r"^\d{9,10}$"]
        .map(|pattern| Regex::new(pattern).expect("phone pattern is valid"))
});

/// Validates a Malaysian phone number after stripping every non-digit.
pub fn validate_malaysian_phone(phone: &str) -> Option<String> {
    if phone.is_empty() {
        return Some("Phone number is required".to_string());
    }
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if MALAYSIAN_PHONE_PATTERNS
        .iter()
        .any(|pattern| pattern.is_match(&digits))
    {
        None
    } else {
        Some("Please enter a valid Malaysian phone number".to_string())
    }
}
