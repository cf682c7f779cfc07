//! Aggregation of per-field results into one error map.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::person::validate_name;
use super::phone::validate_malaysian_phone;

/// Field name to rejection reason. Only failing fields are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `result` under `field` when it is a rejection.
    pub fn check(mut self, field: &str, result: Option<String>) -> Self {
        self.record(field, result);
        self
    }

    pub fn record(&mut self, field: &str, result: Option<String>) {
        if let Some(reason) = result {
            self.0.insert(field.to_string(), reason);
        }
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Clears the error for one field, e.g. when the user edits it.
    pub fn clear_field(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A named rule over a raw string value.
pub type FieldRule<'a> = (&'a str, &'a dyn Fn(&str) -> Option<String>);

/// Applies each rule to the value stored under the same field name.
///
/// Missing values are validated as the empty string.
pub fn validate_form(data: &HashMap<String, String>, rules: &[FieldRule<'_>]) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for (field, rule) in rules {
        let value = data.get(*field).map(String::as_str).unwrap_or("");
        errors.record(field, rule(value));
    }
    errors
}

/// Form input for a personal emergency contact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmergencyContactInput {
    pub name: String,
    pub phone: String,
    pub relationship: Option<String>,
}

pub fn validate_emergency_contact(contact: &EmergencyContactInput) -> FieldErrors {
    let relationship = match &contact.relationship {
        Some(relationship) if relationship.trim().is_empty() => {
            Some("Relationship cannot be empty if provided".to_string())
        }
        _ => None,
    };

    FieldErrors::new()
        .check("name", validate_name(&contact.name, "Contact name"))
        .check("phone", validate_malaysian_phone(&contact.phone))
        .check("relationship", relationship)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{PasswordPolicy, validate_email, validate_password};

    #[test]
    fn test_validate_form_collects_only_failures() {
        let mut data = HashMap::new();
        data.insert("email".to_string(), "new@user.com".to_string());
        data.insert("password".to_string(), "short".to_string());

        let policy = PasswordPolicy::default();
        let email_rule = |v: &str| validate_email(v);
        let password_rule = |v: &str| validate_password(v, &policy);
        let name_rule = |v: &str| validate_name(v, "Full name");

        let rules: [FieldRule<'_>; 3] = [
            ("email", &email_rule),
            ("password", &password_rule),
            ("fullName", &name_rule),
        ];
        let errors = validate_form(&data, &rules);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email"), None);
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 8 characters long")
        );
        assert_eq!(errors.get("fullName"), Some("Full name is required"));
    }

    #[test]
    fn test_clear_field() {
        let mut errors = FieldErrors::new().check("email", Some("bad".to_string()));
        assert!(!errors.is_valid());
        errors.clear_field("email");
        assert!(errors.is_valid());
    }

    #[test]
    fn test_emergency_contact() {
        let valid = EmergencyContactInput {
            name: "Mak Cik Rosnah".to_string(),
            phone: "012-345 6789".to_string(),
            relationship: Some("Aunt".to_string()),
        };
        assert!(validate_emergency_contact(&valid).is_valid());

        let invalid = EmergencyContactInput {
            name: "".to_string(),
            phone: "12".to_string(),
            relationship: Some("   ".to_string()),
        };
        let errors = validate_emergency_contact(&invalid);
        assert_eq!(errors.get("name"), Some("Contact name is required"));
        assert_eq!(
            errors.get("phone"),
            Some("Please enter a valid Malaysian phone number")
        );
        assert_eq!(
            errors.get("relationship"),
            Some("Relationship cannot be empty if provided")
        );
    }

    #[test]
    fn test_serializes_as_map() {
        let errors = FieldErrors::new().check("age", Some("Age is required".to_string()));
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({ "age": "Age is required" })
        );
    }
}
