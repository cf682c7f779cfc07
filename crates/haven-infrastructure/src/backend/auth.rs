//! Auth provider backed by the hosted GoTrue endpoints.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use haven_core::auth::{
    AuthChangeEvent, AuthProvider, Credentials, Session, SessionChange, SignUpOutcome,
};
use haven_core::config::AuthSettings;
use haven_core::error::ProviderError;
use haven_core::profile::ProfileUpdate;
use haven_core::storage::{AUTH_SESSION_KEY, SecureStorage};
use reqwest::Method;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use super::client::BackendClient;
use super::dto::{RefreshRequest, SignUpRequest, SignUpResponse, TokenResponse};

const CHANGE_CHANNEL_CAPACITY: usize = 16;
const SESSION_MISSING: &str = "Auth session missing!";

/// Email/password auth against the hosted backend.
///
/// Persists its session under [`AUTH_SESSION_KEY`] when configured to, and
/// broadcasts every session change after the new session is stored.
pub struct SupabaseAuth {
    client: BackendClient,
    storage: Arc<dyn SecureStorage>,
    settings: AuthSettings,
    current: RwLock<Option<Session>>,
    changes: broadcast::Sender<SessionChange>,
}

impl SupabaseAuth {
    pub fn new(
        client: BackendClient,
        storage: Arc<dyn SecureStorage>,
        settings: AuthSettings,
    ) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            client,
            storage,
            settings,
            current: RwLock::new(None),
            changes,
        }
    }

    /// Replaces the current session everywhere it is held.
    async fn store_session(&self, session: Option<&Session>) {
        *self.current.write().await = session.cloned();
        self.client
            .set_access_token(session.map(|s| s.access_token.clone()))
            .await;

        if !self.settings.persist_session {
            return;
        }
        let persisted = match session {
            Some(session) => match serde_json::to_string(session) {
                Ok(json) => self.storage.set(AUTH_SESSION_KEY, &json).await,
                Err(e) => Err(e.into()),
            },
            None => self.storage.remove_many(&[AUTH_SESSION_KEY]).await,
        };
        if let Err(e) = persisted {
            tracing::warn!("[SupabaseAuth] Failed to persist session: {}", e);
        }
    }

    fn notify(&self, event: AuthChangeEvent, session: Option<Session>) {
        // No receivers is fine.
        let _ = self.changes.send(SessionChange::new(event, session));
    }

    async fn load_persisted(&self) -> Option<Session> {
        if !self.settings.persist_session {
            return None;
        }
        match self.storage.get(AUTH_SESSION_KEY).await {
            Ok(Some(json)) => match serde_json::from_str::<Session>(&json) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!("[SupabaseAuth] Discarding unreadable session: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("[SupabaseAuth] Failed to read persisted session: {}", e);
                None
            }
        }
    }

    async fn current_session(&self) -> Option<Session> {
        if let Some(session) = self.current.read().await.clone() {
            return Some(session);
        }
        self.load_persisted().await
    }

    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Session, ProviderError> {
        let request = self
            .client
            .request(
                Method::POST,
                &self.client.auth_url("token?grant_type=refresh_token"),
            )
            .await
            .json(&RefreshRequest { refresh_token });
        let response: TokenResponse = self.client.send_json(request).await?;
        Ok(response.into_session(Utc::now()))
    }

    fn refresh_margin(&self) -> Duration {
        Duration::seconds(self.settings.refresh_margin_secs.max(0))
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn get_session(&self) -> Result<Option<Session>, ProviderError> {
        let Some(session) = self.current_session().await else {
            return Ok(None);
        };

        let now = Utc::now();
        if !self.settings.auto_refresh_token || !session.expires_within(now, self.refresh_margin())
        {
            self.store_session(Some(&session)).await;
            return Ok(Some(session));
        }

        tracing::info!("[SupabaseAuth] Refreshing expiring session");
        match self.exchange_refresh_token(&session.refresh_token).await {
            Ok(refreshed) => {
                self.store_session(Some(&refreshed)).await;
                Ok(Some(refreshed))
            }
            // Rejected refresh token: the session is dead.
            Err(e) if e.status.is_some() => {
                tracing::warn!("[SupabaseAuth] Refresh rejected, dropping session: {}", e);
                self.store_session(None).await;
                Ok(None)
            }
            Err(e) if session.is_expired_at(now) => Err(e),
            Err(e) => {
                tracing::warn!("[SupabaseAuth] Refresh failed, keeping current token: {}", e);
                self.store_session(Some(&session)).await;
                Ok(Some(session))
            }
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        metadata: &ProfileUpdate,
    ) -> Result<SignUpOutcome, ProviderError> {
        let request = self
            .client
            .request(Method::POST, &self.client.auth_url("signup"))
            .await
            .json(&SignUpRequest {
                email: &credentials.email,
                password: &credentials.password,
                data: metadata,
            });
        let response: SignUpResponse = self.client.send_json(request).await?;

        match response {
            SignUpResponse::Session(tokens) => {
                let session = tokens.into_session(Utc::now());
                self.store_session(Some(&session)).await;
                self.notify(AuthChangeEvent::SignedIn, Some(session.clone()));
                Ok(SignUpOutcome {
                    user: Some(session.user.clone()),
                    session: Some(session),
                })
            }
            SignUpResponse::User(user) => Ok(SignUpOutcome {
                user: Some(user.into_identity()),
                session: None,
            }),
        }
    }

    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<Session, ProviderError> {
        let request = self
            .client
            .request(Method::POST, &self.client.auth_url("token?grant_type=password"))
            .await
            .json(credentials);
        let response: TokenResponse = self.client.send_json(request).await?;

        let session = response.into_session(Utc::now());
        self.store_session(Some(&session)).await;
        tracing::info!("[SupabaseAuth] Signed in {}", session.user_id());
        self.notify(AuthChangeEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    /// Revokes the session remotely; the local session is dropped either way.
    async fn sign_out(&self) -> Result<(), ProviderError> {
        let remote = match self.current_session().await {
            Some(session) => {
                let request = self.client.authorized(
                    Method::POST,
                    &self.client.auth_url("logout"),
                    &session.access_token,
                );
                self.client.send_empty(request).await
            }
            None => Ok(()),
        };

        self.store_session(None).await;
        self.notify(AuthChangeEvent::SignedOut, None);
        remote
    }

    async fn refresh_session(&self) -> Result<Session, ProviderError> {
        let current = self
            .current_session()
            .await
            .ok_or_else(|| ProviderError::new(SESSION_MISSING))?;

        let session = self.exchange_refresh_token(&current.refresh_token).await?;
        self.store_session(Some(&session)).await;
        self.notify(AuthChangeEvent::TokenRefreshed, Some(session.clone()));
        Ok(session)
    }
}
