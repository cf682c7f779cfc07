//! Wire shapes of the auth endpoints.

use chrono::{DateTime, Duration, Utc};
use haven_core::auth::{Session, UserIdentity};
use haven_core::profile::ProfileUpdate;
use serde::{Deserialize, Serialize};

/// Lifetime assumed when a token response carries no expiry.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Deserialize)]
pub(crate) struct UserDto {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl UserDto {
    pub fn into_identity(self) -> UserIdentity {
        let metadata = match self.user_metadata {
            serde_json::Value::Null => ProfileUpdate::default(),
            value => serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::debug!("[Backend] Ignoring unreadable user metadata: {}", e);
                ProfileUpdate::default()
            }),
        };
        UserIdentity {
            id: self.id.into(),
            email: self.email.unwrap_or_default(),
            email_confirmed_at: self.email_confirmed_at,
            metadata,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix seconds
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: UserDto,
}

impl TokenResponse {
    pub fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(|| {
                now + Duration::seconds(self.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS))
            });
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_at,
            user: self.user.into_identity(),
        }
    }
}

/// Sign-up answers with a full session when no confirmation is required,
/// and with the bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SignUpResponse {
    Session(TokenResponse),
    User(UserDto),
}

#[derive(Debug, Serialize)]
pub(crate) struct SignUpRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub data: &'a ProfileUpdate,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}
