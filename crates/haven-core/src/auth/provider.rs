//! Remote authentication provider trait.

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::model::{Credentials, Session, SessionChange, SignUpOutcome};
use crate::error::ProviderError;
use crate::profile::ProfileUpdate;

/// The hosted authentication service, consumed as a black box.
///
/// Implementations own session issuance, token refresh and persistence of
/// their own session blob. Every change to the provider-side session is
/// pushed to subscribers exactly once.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the persisted session, if any.
    async fn get_session(&self) -> Result<Option<Session>, ProviderError>;

    /// Subscribes to session change notifications.
    fn subscribe(&self) -> broadcast::Receiver<SessionChange>;

    /// Registers a new account, forwarding `metadata` as user metadata.
    async fn sign_up(
        &self,
        credentials: &Credentials,
        metadata: &ProfileUpdate,
    ) -> Result<SignUpOutcome, ProviderError>;

    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<Session, ProviderError>;

    /// Invalidates the current session remotely.
    async fn sign_out(&self) -> Result<(), ProviderError>;

    async fn refresh_session(&self) -> Result<Session, ProviderError>;
}
