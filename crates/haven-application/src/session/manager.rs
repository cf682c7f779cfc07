use chrono::Utc;
use haven_core::auth::{
    AuthChangeEvent, AuthProvider, Credentials, SessionChange, SignUpOutcome, UserId,
};
use haven_core::error::{HavenError, Result};
use haven_core::profile::{ProfileRepository, ProfileUpdate, UserProfile};
use haven_core::storage::{SIGN_OUT_KEYS, SecureStorage};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

use super::state::AuthSnapshot;
use super::worker::{Command, SessionWorker, commit, forward_changes};

/// Owns the authenticated session, the user identity and the user profile.
///
/// `SessionManager` is responsible for:
/// - Recovering a persisted session on startup
/// - Signing users up, in and out through the [`AuthProvider`]
/// - Loading and lazily creating the profile of the signed-in user
/// - Publishing every transition as a whole [`AuthSnapshot`]
///
/// Operations never write state directly. Sign-in success in particular is
/// observed only through the provider's change notification, so the
/// notification stream is the single source of truth for session state.
///
/// # Thread Safety
///
/// All methods take `&self`; share the manager behind an `Arc`. Background
/// tasks stop when the manager is dropped or [`SessionManager::shutdown`]
/// is called.
pub struct SessionManager {
    provider: Arc<dyn AuthProvider>,
    profiles: Arc<dyn ProfileRepository>,
    storage: Arc<dyn SecureStorage>,
    inbox: mpsc::UnboundedSender<Command>,
    state_tx: Arc<watch::Sender<AuthSnapshot>>,
    state: watch::Receiver<AuthSnapshot>,
    cancel: CancellationToken,
}

impl SessionManager {
    /// Creates the manager and starts its background tasks.
    ///
    /// Subscribes to provider notifications before returning, so no change
    /// emitted after construction is missed.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        profiles: Arc<dyn ProfileRepository>,
        storage: Arc<dyn SecureStorage>,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(AuthSnapshot::initial());
        let state_tx = Arc::new(state_tx);
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let worker = SessionWorker::new(profiles.clone(), state_tx.clone());
        tokio::spawn(worker.run(inbox_rx, cancel.clone()));
        tokio::spawn(forward_changes(
            provider.clone(),
            provider.subscribe(),
            inbox_tx.clone(),
            cancel.clone(),
        ));

        Self {
            provider,
            profiles,
            storage,
            inbox: inbox_tx,
            state_tx,
            state: state_rx,
            cancel,
        }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.borrow().clone()
    }

    /// Returns a receiver notified on every committed transition.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.state.clone()
    }

    /// Recovers the persisted session, if any, and loads its profile.
    ///
    /// Never fails: a provider error is logged and leaves the manager
    /// unauthenticated. Returns once the recovered state is committed.
    pub async fn initialize(&self) {
        tracing::info!("[SessionManager] Initializing");
        self.dispatch(|ack| Command::BeginInitialize { ack }).await;

        let session = match self.provider.get_session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("[SessionManager] Failed to recover session: {}", e);
                None
            }
        };
        let change = SessionChange::new(AuthChangeEvent::InitialSession, session);
        self.dispatch(|ack| Command::Apply {
            change,
            ack: Some(ack),
        })
        .await;
    }

    /// Registers a new account, forwarding `seed` as profile seed metadata.
    ///
    /// When the provider requires email confirmation the returned outcome has
    /// no session and the manager stays unauthenticated.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        seed: ProfileUpdate,
    ) -> Result<SignUpOutcome> {
        let credentials = Credentials::new(email, password);
        match self.provider.sign_up(&credentials, &seed).await {
            Ok(outcome) => {
                if outcome.confirmation_pending() {
                    tracing::info!("[SessionManager] Sign-up awaiting email confirmation");
                } else {
                    tracing::info!("[SessionManager] Sign-up issued a session");
                }
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!("[SessionManager] Sign-up failed: {}", e);
                Err(e.into_auth_error())
            }
        }
    }

    /// Signs in with email and password.
    ///
    /// Success does not touch state here; the provider's `SignedIn`
    /// notification carries the session to the worker.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        let credentials = Credentials::new(email, password);
        self.provider
            .sign_in_with_password(&credentials)
            .await
            .map(|_| ())
            .map_err(|e| {
                tracing::warn!("[SessionManager] Sign-in failed: {}", e);
                e.into_auth_error()
            })
    }

    /// Signs out.
    ///
    /// Cached keys are removed before the remote call, and local state is
    /// cleared whatever the remote outcome. A remote failure is still
    /// returned so the caller can surface it.
    pub async fn sign_out(&self) -> Result<()> {
        if let Err(e) = self.storage.remove_many(SIGN_OUT_KEYS).await {
            tracing::warn!("[SessionManager] Failed to clear cached user data: {}", e);
        }

        let remote = self.provider.sign_out().await;
        if let Err(e) = &remote {
            tracing::warn!(
                "[SessionManager] Remote sign-out failed, clearing local state anyway: {}",
                e
            );
        }

        let cleared = self
            .dispatch(|ack| Command::Apply {
                change: SessionChange::signed_out(),
                ack: Some(ack),
            })
            .await;
        if cleared.is_none() {
            // Worker is gone, so nothing else writes the state.
            commit(&self.state_tx, AuthSnapshot::signed_out());
        }
        tracing::info!("[SessionManager] Signed out");

        remote.map_err(|e| e.into_auth_error())
    }

    /// Applies `update` to the signed-in user's profile.
    ///
    /// The server row replaces the cached profile wholesale. Fails with
    /// [`HavenError::NoSession`] without any remote call when nobody is
    /// signed in.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile> {
        let user_id = self.current_user_id().ok_or(HavenError::NoSession)?;

        let row = self
            .profiles
            .update(&user_id, &update, Utc::now())
            .await
            .inspect_err(|e| tracing::warn!("[SessionManager] Profile update failed: {}", e))?;

        let applied = self
            .dispatch(|ack| Command::ProfileLoaded {
                user_id,
                profile: row.clone(),
                ack: Some(ack),
            })
            .await
            .unwrap_or(false);
        if !applied {
            tracing::debug!("[SessionManager] Session changed during profile update");
        }
        Ok(row)
    }

    pub async fn complete_onboarding(&self) -> Result<UserProfile> {
        self.update_profile(ProfileUpdate::onboarding_completed()).await
    }

    /// Re-reads the profile of the signed-in user.
    ///
    /// No-op without a session. Failures are logged and keep the cached profile.
    pub async fn refresh_profile(&self) {
        let Some(user_id) = self.current_user_id() else {
            return;
        };

        match self.profiles.find_by_user_id(&user_id).await {
            Ok(Some(profile)) => {
                self.dispatch(|ack| Command::ProfileLoaded {
                    user_id,
                    profile,
                    ack: Some(ack),
                })
                .await;
            }
            Ok(None) => {
                tracing::warn!("[SessionManager] No profile row for {}", user_id);
            }
            Err(e) => {
                tracing::warn!("[SessionManager] Failed to refresh profile: {}", e);
            }
        }
    }

    /// Asks the provider for fresh tokens.
    ///
    /// The new session arrives through the `TokenRefreshed` notification.
    pub async fn refresh_session(&self) -> Result<()> {
        self.provider
            .refresh_session()
            .await
            .map(|_| ())
            .map_err(|e| {
                tracing::warn!("[SessionManager] Session refresh failed: {}", e);
                e.into_auth_error()
            })
    }

    /// Stops the background tasks.
    ///
    /// Pending operations resolve without effect, except `sign_out`, which
    /// still clears local state.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn current_user_id(&self) -> Option<UserId> {
        self.state.borrow().user_id().cloned()
    }

    /// Enqueues a command and waits for the worker to acknowledge it.
    ///
    /// Returns `None` when the worker has stopped.
    async fn dispatch<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Option<T> {
        let (ack, done) = oneshot::channel();
        if self.inbox.send(build(ack)).is_err() {
            tracing::warn!("[SessionManager] Session worker is not running");
            return None;
        }
        done.await.ok()
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
