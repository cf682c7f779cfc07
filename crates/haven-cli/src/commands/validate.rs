use anyhow::{Result, bail};
use clap::Subcommand;
use haven_core::validation::{
    EmergencyContactInput, FieldErrors, MalaysianState, PasswordPolicy, StrengthLevel,
    password_strength, validate_age, validate_confirm_password, validate_email,
    validate_emergency_contact, validate_malaysian_location, validate_malaysian_phone,
    validate_name, validate_password,
};

#[derive(Subcommand)]
pub enum ValidateAction {
    Email {
        value: String,
    },
    Password {
        value: String,
        /// Minimum length
        #[arg(long, default_value_t = 8)]
        min_length: usize,
        /// Check length only, without character classes
        #[arg(long)]
        length_only: bool,
        /// Also check that this confirmation matches
        #[arg(long)]
        confirm: Option<String>,
    },
    Name {
        value: String,
        /// Field label used in messages
        #[arg(long, default_value = "Name")]
        field: String,
    },
    Age {
        value: String,
    },
    Phone {
        value: String,
    },
    Location {
        value: String,
    },
    /// Validate a personal emergency contact
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        relationship: Option<String>,
    },
}

pub fn run(action: ValidateAction) -> Result<()> {
    let errors = match action {
        ValidateAction::Email { value } => FieldErrors::new().check("email", validate_email(&value)),
        ValidateAction::Password {
            value,
            min_length,
            length_only,
            confirm,
        } => {
            let policy = if length_only {
                PasswordPolicy::length_only(min_length)
            } else {
                PasswordPolicy::default().with_min_length(min_length)
            };
            let confirm_result = confirm
                .as_deref()
                .and_then(|confirm| validate_confirm_password(&value, confirm));
            FieldErrors::new()
                .check("password", validate_password(&value, &policy))
                .check("confirmPassword", confirm_result)
        }
        ValidateAction::Name { value, field } => {
            FieldErrors::new().check("name", validate_name(&value, &field))
        }
        ValidateAction::Age { value } => FieldErrors::new().check("age", validate_age(&value)),
        ValidateAction::Phone { value } => {
            FieldErrors::new().check("phone", validate_malaysian_phone(&value))
        }
        ValidateAction::Location { value } => {
            FieldErrors::new().check("location", validate_malaysian_location(&value))
        }
        ValidateAction::Contact {
            name,
            phone,
            relationship,
        } => validate_emergency_contact(&EmergencyContactInput {
            name,
            phone,
            relationship,
        }),
    };
    report(&errors)
}

/// Prints the outcome; invalid input is an error so the exit code reflects it.
pub fn report(errors: &FieldErrors) -> Result<()> {
    if errors.is_valid() {
        println!("valid");
        return Ok(());
    }
    for (field, reason) in errors.iter() {
        println!("{}: {}", field, reason);
    }
    bail!("{} invalid field(s)", errors.len())
}

pub fn strength(password: &str) {
    let strength = password_strength(password);
    println!("{} ({}/5)", strength.level, strength.score);
    if strength.level < StrengthLevel::Strong {
        for hint in &strength.feedback {
            println!("  - {}", hint);
        }
    }
}

pub fn states() {
    for name in MalaysianState::names() {
        println!("{}", name);
    }
}
