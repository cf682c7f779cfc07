//! UserProfile domain model.
//!
//! Represents app-specific user data stored in the `user_profiles` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;

/// User profile row.
///
/// Keyed by the auth user id. The server is the source of truth for
/// trigger-set columns, so updates always replace this wholesale with the
/// returned row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    /// Malaysian state or federal territory
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub onboarding_completed: bool,
    #[serde(default)]
    pub buddy_assigned_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Builds a fresh profile row from the sign-up seed.
    pub fn from_seed(id: UserId, seed: &ProfileUpdate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            full_name: seed.full_name.clone(),
            age: seed.age,
            location: seed.location.clone(),
            phone: seed.phone.clone(),
            profile_image_url: seed.profile_image_url.clone(),
            onboarding_completed: seed.onboarding_completed.unwrap_or(false),
            buddy_assigned_id: seed.buddy_assigned_id.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the display name, falling back to the given default.
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.full_name.as_deref().unwrap_or(fallback)
    }
}

/// Partial profile update. `None` fields are left untouched.
///
/// Doubles as the profile seed passed to the provider at sign-up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buddy_assigned_id: Option<String>,
}

impl ProfileUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn onboarding_completed() -> Self {
        Self {
            onboarding_completed: Some(true),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Wire payload for a profile update: the partial fields plus a fresh timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct ProfilePatch<'a> {
    #[serde(flatten)]
    pub update: &'a ProfileUpdate,
    pub updated_at: DateTime<Utc>,
}
