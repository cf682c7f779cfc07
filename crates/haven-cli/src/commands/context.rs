//! Wiring of infrastructure adapters into the application services.

use anyhow::{Context, Result};
use haven_application::{AuthSnapshot, EmergencyUseCase, SessionManager};
use haven_core::config::RootConfig;
use haven_core::storage::SecureStorage;
use haven_infrastructure::{
    BackendClient, CommandDialer, ConfigService, FileSecureStorage, MemorySecureStorage,
    RestEmergencyRepository, RestProfileRepository, SupabaseAuth,
};
use std::sync::Arc;
use std::time::Duration;

const SIGN_IN_TIMEOUT: Duration = Duration::from_secs(10);

pub struct AppContext {
    pub config: RootConfig,
    pub session: Arc<SessionManager>,
    client: BackendClient,
}

impl AppContext {
    /// Connects to the configured backend and recovers any persisted session.
    pub async fn connect(config_service: &ConfigService) -> Result<Self> {
        let config = config_service.get_config();
        let client = BackendClient::new(&config.backend).context(
            "Backend not configured: set HAVEN_BACKEND_URL and HAVEN_ANON_KEY or run `haven config init`",
        )?;

        let storage: Arc<dyn SecureStorage> = if config.auth.persist_session {
            Arc::new(FileSecureStorage::new().context("Failed to open secure storage")?)
        } else {
            Arc::new(MemorySecureStorage::new())
        };
        let provider = Arc::new(SupabaseAuth::new(
            client.clone(),
            storage.clone(),
            config.auth.clone(),
        ));
        let profiles = Arc::new(RestProfileRepository::new(client.clone()));

        let session = Arc::new(SessionManager::new(provider, profiles, storage));
        session.initialize().await;

        Ok(Self {
            config,
            session,
            client,
        })
    }

    pub fn emergency(&self) -> EmergencyUseCase {
        EmergencyUseCase::new(
            self.session.clone(),
            Arc::new(RestEmergencyRepository::new(self.client.clone())),
            Arc::new(CommandDialer::new(self.config.emergency.dialer_command.clone())),
        )
        .with_call_all_delay(Duration::from_millis(self.config.emergency.call_all_delay_ms))
        .with_history_limit(self.config.emergency.history_limit)
    }

    /// Waits until the sign-in notification has been applied.
    pub async fn wait_for_session(&self) -> Result<AuthSnapshot> {
        let mut rx = self.session.subscribe();
        let snapshot = tokio::time::timeout(
            SIGN_IN_TIMEOUT,
            rx.wait_for(|s| s.is_authenticated()),
        )
        .await
        .context("Timed out waiting for the session")?
        .context("Session manager stopped")?
        .clone();
        Ok(snapshot)
    }

    /// Returns the snapshot, failing when nobody is signed in.
    pub fn require_session(&self) -> Result<AuthSnapshot> {
        let snapshot = self.session.snapshot();
        anyhow::ensure!(
            snapshot.is_authenticated(),
            "Not signed in. Run `haven sign-in` first."
        );
        Ok(snapshot)
    }
}
