//! Observable authentication state.

use haven_core::auth::{Session, UserId, UserIdentity};
use haven_core::profile::UserProfile;

/// Lifecycle phase of the session manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Uninitialized,
    /// Recovering a persisted session at startup.
    Initializing,
    Authenticated,
    Unauthenticated,
}

/// A consistent view of Session, User and Profile.
///
/// Snapshots are committed whole by the session worker, so a reader never
/// sees the user of one transition next to the session of another. The
/// user identity is read from the session and cannot diverge from it.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSnapshot {
    pub phase: AuthPhase,
    pub session: Option<Session>,
    pub profile: Option<UserProfile>,
    /// Incremented on every committed transition.
    pub revision: u64,
}

impl AuthSnapshot {
    pub(crate) fn initial() -> Self {
        Self {
            phase: AuthPhase::Uninitialized,
            session: None,
            profile: None,
            revision: 0,
        }
    }

    /// Cleared state; `revision` is assigned on commit.
    pub(crate) fn signed_out() -> Self {
        Self {
            phase: AuthPhase::Unauthenticated,
            ..Self::initial()
        }
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        self.session.as_ref().map(|session| &session.user)
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user().map(|user| &user.id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == AuthPhase::Authenticated && self.session.is_some()
    }

    pub fn is_initializing(&self) -> bool {
        matches!(self.phase, AuthPhase::Uninitialized | AuthPhase::Initializing)
    }

    /// True when session and profile are either both present for the same
    /// user or both absent.
    pub fn is_complete(&self) -> bool {
        match (&self.session, &self.profile) {
            (None, None) => true,
            (Some(session), Some(profile)) => session.user.id == profile.id,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use haven_core::profile::ProfileUpdate;

    fn session_for(id: &str) -> Session {
        Session {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            token_type: "bearer".to_string(),
            expires_at: Utc::now(),
            user: UserIdentity::new(id, format!("{id}@example.com")),
        }
    }

    #[test]
    fn test_initial_snapshot() {
        let snapshot = AuthSnapshot::initial();
        assert!(snapshot.is_initializing());
        assert!(!snapshot.is_authenticated());
        assert!(snapshot.is_complete());
        assert!(snapshot.user().is_none());
    }

    #[test]
    fn test_completeness() {
        let profile =
            UserProfile::from_seed(UserId::new("u1"), &ProfileUpdate::default(), Utc::now());
        let mut snapshot = AuthSnapshot {
            phase: AuthPhase::Authenticated,
            session: Some(session_for("u1")),
            profile: None,
            revision: 1,
        };
        assert!(!snapshot.is_complete());

        snapshot.profile = Some(profile.clone());
        assert!(snapshot.is_complete());
        assert_eq!(snapshot.user_id(), Some(&UserId::new("u1")));

        snapshot.session = Some(session_for("u2"));
        assert!(!snapshot.is_complete());

        snapshot.session = None;
        assert!(!snapshot.is_complete());
    }
}
