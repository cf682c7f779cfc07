//! Form validation rules.
//!
//! Every rule is a pure function returning `None` when the value is accepted
//! or `Some(reason)` naming exactly one violated rule. Forms aggregate rule
//! results into [`FieldErrors`].

mod email;
mod form;
mod location;
mod password;
mod person;
mod phone;
mod text;

pub use email::{MAX_EMAIL_LENGTH, validate_email};
pub use form::{
    EmergencyContactInput, FieldErrors, FieldRule, validate_emergency_contact, validate_form,
};
pub use location::{MalaysianState, validate_malaysian_location};
pub use password::{
    PasswordPolicy, PasswordStrength, SPECIAL_CHARACTERS, StrengthLevel, password_strength,
    validate_confirm_password, validate_password,
};
pub use person::{
    MAX_AGE, MAX_NAME_LENGTH, MIN_AGE, MIN_NAME_LENGTH, validate_age, validate_age_value,
    validate_name,
};
pub use phone::validate_malaysian_phone;
pub use text::{TextRule, validate_text};
