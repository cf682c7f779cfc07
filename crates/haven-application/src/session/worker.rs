//! Single writer for the shared authentication state.
//!
//! Provider notifications, initialization and local operations all enqueue
//! commands into one ordered inbox. The worker drains it one command at a
//! time, so transitions commit in arrival order and each commit replaces
//! the whole snapshot.

use chrono::Utc;
use haven_core::auth::{AuthChangeEvent, AuthProvider, Session, SessionChange, UserId};
use haven_core::error::{HavenError, Result};
use haven_core::profile::{ProfileRepository, UserProfile};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

use super::state::{AuthPhase, AuthSnapshot};

pub(crate) enum Command {
    /// Marks the start of session recovery.
    BeginInitialize { ack: oneshot::Sender<()> },
    /// Applies a session transition reported by the provider or synthesized locally.
    Apply {
        change: SessionChange,
        ack: Option<oneshot::Sender<()>>,
    },
    /// Replaces the profile if `user_id` is still the signed-in user.
    ProfileLoaded {
        user_id: UserId,
        profile: UserProfile,
        ack: Option<oneshot::Sender<bool>>,
    },
}

pub(crate) struct SessionWorker {
    profiles: Arc<dyn ProfileRepository>,
    state: Arc<watch::Sender<AuthSnapshot>>,
}

impl SessionWorker {
    pub(crate) fn new(
        profiles: Arc<dyn ProfileRepository>,
        state: Arc<watch::Sender<AuthSnapshot>>,
    ) -> Self {
        Self { profiles, state }
    }

    pub(crate) async fn run(
        self,
        mut inbox: mpsc::UnboundedReceiver<Command>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                command = inbox.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => break,
                },
            }
        }
        tracing::debug!("[SessionWorker] Stopped");
    }

    async fn handle(&self, command: Command) {
        match command {
            Command::BeginInitialize { ack } => {
                let current = self.current();
                self.commit(AuthSnapshot {
                    phase: AuthPhase::Initializing,
                    ..current
                });
                let _ = ack.send(());
            }
            Command::Apply { change, ack } => {
                self.apply_change(change).await;
                if let Some(ack) = ack {
                    let _ = ack.send(());
                }
            }
            Command::ProfileLoaded {
                user_id,
                profile,
                ack,
            } => {
                let applied = self.apply_profile(&user_id, profile);
                if let Some(ack) = ack {
                    let _ = ack.send(applied);
                }
            }
        }
    }

    async fn apply_change(&self, change: SessionChange) {
        let current = self.current();

        // Recovery result loses to any transition that landed while it was in flight.
        if change.event == AuthChangeEvent::InitialSession && !current.is_initializing() {
            tracing::debug!("[SessionWorker] Ignoring stale initial session");
            return;
        }

        let Some(session) = change.session else {
            if current.session.is_some() {
                tracing::info!("[SessionWorker] Signed out ({:?})", change.event);
            }
            self.commit(AuthSnapshot::signed_out());
            return;
        };

        let cached = current
            .profile
            .filter(|profile| &profile.id == session.user_id());

        let profile = match (change.event, cached) {
            (AuthChangeEvent::TokenRefreshed, Some(profile)) => Some(profile),
            (_, cached) => match self.load_profile(&session).await {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!(
                        "[SessionWorker] Profile unavailable for {}: {}",
                        session.user_id(),
                        e
                    );
                    cached
                }
            },
        };

        tracing::info!(
            "[SessionWorker] {:?} for user {}",
            change.event,
            session.user_id()
        );
        self.commit(AuthSnapshot {
            phase: AuthPhase::Authenticated,
            session: Some(session),
            profile,
            revision: current.revision,
        });
    }

    fn apply_profile(&self, user_id: &UserId, profile: UserProfile) -> bool {
        let current = self.current();
        if current.user_id() != Some(user_id) || &profile.id != user_id {
            tracing::debug!(
                "[SessionWorker] Discarding profile for {}: no longer signed in",
                user_id
            );
            return false;
        }
        self.commit(AuthSnapshot {
            profile: Some(profile),
            ..current
        });
        true
    }

    /// Fetches the profile row, creating it from the sign-up seed when missing.
    async fn load_profile(&self, session: &Session) -> Result<UserProfile> {
        let user_id = session.user_id();
        let existing = self
            .profiles
            .find_by_user_id(user_id)
            .await
            .map_err(|e| HavenError::ProfileFetch(e.to_string()))?;
        if let Some(profile) = existing {
            return Ok(profile);
        }

        tracing::info!("[SessionWorker] Creating profile for {}", user_id);
        let seed = UserProfile::from_seed(user_id.clone(), &session.user.metadata, Utc::now());
        self.profiles
            .insert(&seed)
            .await
            .map_err(|e| HavenError::ProfileFetch(e.to_string()))
    }

    fn current(&self) -> AuthSnapshot {
        self.state.borrow().clone()
    }

    fn commit(&self, next: AuthSnapshot) {
        commit(&self.state, next);
    }
}

/// Publishes `next` as the new snapshot with the following revision.
pub(crate) fn commit(state: &watch::Sender<AuthSnapshot>, next: AuthSnapshot) {
    state.send_modify(|current| {
        let revision = current.revision + 1;
        *current = AuthSnapshot { revision, ..next };
    });
}

/// Moves provider notifications into the inbox in delivery order.
///
/// When notifications were dropped the provider's current session is read
/// back and applied, so state cannot drift from the provider.
pub(crate) async fn forward_changes(
    provider: Arc<dyn AuthProvider>,
    mut changes: broadcast::Receiver<SessionChange>,
    inbox: mpsc::UnboundedSender<Command>,
    cancel: CancellationToken,
) {
    loop {
        let received = tokio::select! {
            _ = cancel.cancelled() => break,
            received = changes.recv() => received,
        };
        match received {
            Ok(change) => {
                if inbox.send(Command::Apply { change, ack: None }).is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(
                    "[SessionWorker] Missed {} provider notifications, resyncing",
                    skipped
                );
                let Some(change) = resync(provider.as_ref()).await else {
                    continue;
                };
                if inbox.send(Command::Apply { change, ack: None }).is_err() {
                    break;
                }
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Reads the provider's current session as a change to apply.
///
/// A live session is applied as a token refresh, which keeps the cached
/// profile of the same user.
async fn resync(provider: &dyn AuthProvider) -> Option<SessionChange> {
    match provider.get_session().await {
        Ok(Some(session)) => Some(SessionChange::new(
            AuthChangeEvent::TokenRefreshed,
            Some(session),
        )),
        Ok(None) => Some(SessionChange::signed_out()),
        Err(e) => {
            tracing::error!("[SessionWorker] Failed to resync session: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CallTrace, MockAuthProvider, session_for};
    use haven_core::auth::UserIdentity;
    use haven_core::error::ProviderError;
    use std::sync::Mutex;

    fn applied(command: Option<Command>) -> SessionChange {
        match command {
            Some(Command::Apply { change, .. }) => change,
            _ => panic!("expected a session change"),
        }
    }

    fn signed_in(user: &UserIdentity, generation: u32) -> SessionChange {
        SessionChange::new(
            AuthChangeEvent::SignedIn,
            Some(session_for(user.clone(), generation)),
        )
    }

    #[tokio::test]
    async fn test_forward_changes_resyncs_after_lag() {
        let trace: CallTrace = Arc::new(Mutex::new(Vec::new()));
        let provider = Arc::new(MockAuthProvider::new(trace));
        let user = UserIdentity::new("user-1", "user@example.com");
        provider.persist(session_for(user.clone(), 3));

        let (changes_tx, changes_rx) = broadcast::channel(2);
        for generation in 0..4 {
            changes_tx.send(signed_in(&user, generation)).unwrap();
        }
        let (inbox_tx, mut inbox_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(forward_changes(
            provider,
            changes_rx,
            inbox_tx,
            cancel.clone(),
        ));

        let resynced = applied(inbox_rx.recv().await);
        assert_eq!(resynced.event, AuthChangeEvent::TokenRefreshed);
        assert_eq!(resynced.session.unwrap().access_token, "access-user-1-3");

        // Retained notifications follow in delivery order.
        let next = applied(inbox_rx.recv().await);
        assert_eq!(next.session.unwrap().access_token, "access-user-1-2");
        let last = applied(inbox_rx.recv().await);
        assert_eq!(last.session.unwrap().access_token, "access-user-1-3");

        cancel.cancel();
        drop(changes_tx);
    }

    #[tokio::test]
    async fn test_forward_changes_lag_with_signed_out_provider() {
        let trace: CallTrace = Arc::new(Mutex::new(Vec::new()));
        let provider = Arc::new(MockAuthProvider::new(trace));
        let user = UserIdentity::new("user-1", "user@example.com");

        let (changes_tx, changes_rx) = broadcast::channel(1);
        changes_tx.send(signed_in(&user, 0)).unwrap();
        changes_tx.send(SessionChange::signed_out()).unwrap();
        let (inbox_tx, mut inbox_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(forward_changes(
            provider,
            changes_rx,
            inbox_tx,
            cancel.clone(),
        ));

        let resynced = applied(inbox_rx.recv().await);
        assert_eq!(resynced, SessionChange::signed_out());
        assert_eq!(applied(inbox_rx.recv().await), SessionChange::signed_out());

        cancel.cancel();
        drop(changes_tx);
    }

    #[tokio::test]
    async fn test_forward_changes_skips_failed_resync() {
        let trace: CallTrace = Arc::new(Mutex::new(Vec::new()));
        let provider = Arc::new(MockAuthProvider::new(trace));
        *provider.get_session_error.lock().unwrap() =
            Some(ProviderError::new("Failed to fetch"));
        let user = UserIdentity::new("user-1", "user@example.com");

        let (changes_tx, changes_rx) = broadcast::channel(1);
        changes_tx.send(signed_in(&user, 0)).unwrap();
        changes_tx.send(signed_in(&user, 1)).unwrap();
        let (inbox_tx, mut inbox_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(forward_changes(
            provider,
            changes_rx,
            inbox_tx,
            cancel.clone(),
        ));

        let next = applied(inbox_rx.recv().await);
        assert_eq!(next.event, AuthChangeEvent::SignedIn);
        assert_eq!(next.session.unwrap().access_token, "access-user-1-1");

        cancel.cancel();
        drop(changes_tx);
    }
}
