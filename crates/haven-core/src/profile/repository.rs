//! Profile repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{ProfileUpdate, UserProfile};
use crate::auth::UserId;
use crate::error::Result;

/// Row access to the profile table, scoped by user id.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Returns the profile row for `user_id`, or `None` when it does not exist yet.
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<UserProfile>>;

    /// Inserts a new profile row and returns the stored row.
    async fn insert(&self, profile: &UserProfile) -> Result<UserProfile>;

    /// Applies `update` plus `updated_at` and returns the server-side row.
    async fn update(
        &self,
        user_id: &UserId,
        update: &ProfileUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<UserProfile>;
}
