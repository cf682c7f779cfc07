//! In-memory test doubles for the application layer.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use haven_core::auth::{
    AuthChangeEvent, AuthProvider, Credentials, Session, SessionChange, SignUpOutcome, UserId,
    UserIdentity,
};
use haven_core::dialer::Dialer;
use haven_core::emergency::{
    CallLog, EmergencyContact, EmergencyRepository, EmergencyService, NewCallLog,
};
use haven_core::error::{HavenError, ProviderError, Result};
use haven_core::profile::{ProfileRepository, ProfileUpdate, UserProfile};
use haven_core::storage::SecureStorage;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

/// Ordered record of calls across several mocks.
pub(crate) type CallTrace = Arc<Mutex<Vec<String>>>;

pub(crate) fn session_for(user: UserIdentity, generation: u32) -> Session {
    Session {
        access_token: format!("access-{}-{}", user.id, generation),
        refresh_token: format!("refresh-{}-{}", user.id, generation),
        token_type: "bearer".to_string(),
        expires_at: Utc::now() + ChronoDuration::hours(1),
        user,
    }
}

struct Account {
    password: String,
    identity: UserIdentity,
}

pub(crate) struct MockAuthProvider {
    changes: broadcast::Sender<SessionChange>,
    accounts: Mutex<HashMap<String, Account>>,
    persisted: Mutex<Option<Session>>,
    generation: AtomicUsize,
    pub(crate) require_confirmation: AtomicBool,
    pub(crate) get_session_error: Mutex<Option<ProviderError>>,
    pub(crate) sign_out_error: Mutex<Option<ProviderError>>,
    trace: CallTrace,
}

impl MockAuthProvider {
    pub(crate) fn new(trace: CallTrace) -> Self {
        let (changes, _) = broadcast::channel(32);
        Self {
            changes,
            accounts: Mutex::new(HashMap::new()),
            persisted: Mutex::new(None),
            generation: AtomicUsize::new(0),
            require_confirmation: AtomicBool::new(true),
            get_session_error: Mutex::new(None),
            sign_out_error: Mutex::new(None),
            trace,
        }
    }

    /// Registers a confirmed account directly.
    pub(crate) fn add_account(&self, identity: UserIdentity, password: &str) {
        self.accounts.lock().unwrap().insert(
            identity.email.clone(),
            Account {
                password: password.to_string(),
                identity,
            },
        );
    }

    /// Pretends a session survived from a previous run.
    pub(crate) fn persist(&self, session: Session) {
        *self.persisted.lock().unwrap() = Some(session);
    }

    pub(crate) fn emit(&self, change: SessionChange) {
        let _ = self.changes.send(change);
    }

    fn issue(&self, user: UserIdentity) -> Session {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) as u32;
        let session = session_for(user, generation);
        *self.persisted.lock().unwrap() = Some(session.clone());
        session
    }

    fn record(&self, call: &str) {
        self.trace.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn get_session(&self) -> std::result::Result<Option<Session>, ProviderError> {
        if let Some(e) = self.get_session_error.lock().unwrap().clone() {
            return Err(e);
        }
        Ok(self.persisted.lock().unwrap().clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        metadata: &ProfileUpdate,
    ) -> std::result::Result<SignUpOutcome, ProviderError> {
        self.record("provider.sign_up");
        let identity = {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(&credentials.email) {
                return Err(ProviderError::with_status("User already registered", 422));
            }
            let mut identity = UserIdentity::new(
                format!("user-{}", accounts.len() + 1),
                credentials.email.clone(),
            );
            identity.metadata = metadata.clone();
            accounts.insert(
                credentials.email.clone(),
                Account {
                    password: credentials.password.clone(),
                    identity: identity.clone(),
                },
            );
            identity
        };

        if self.require_confirmation.load(Ordering::SeqCst) {
            return Ok(SignUpOutcome {
                user: Some(identity),
                session: None,
            });
        }

        let session = self.issue(identity.clone());
        self.emit(SessionChange::new(
            AuthChangeEvent::SignedIn,
            Some(session.clone()),
        ));
        Ok(SignUpOutcome {
            user: Some(identity),
            session: Some(session),
        })
    }

    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> std::result::Result<Session, ProviderError> {
        self.record("provider.sign_in");
        let identity = {
            let accounts = self.accounts.lock().unwrap();
            match accounts.get(&credentials.email) {
                Some(account) if account.password == credentials.password => {
                    account.identity.clone()
                }
                _ => {
                    return Err(ProviderError::with_status(
                        "Invalid login credentials",
                        400,
                    ));
                }
            }
        };

        let session = self.issue(identity);
        // The provider notifies before the direct response returns.
        self.emit(SessionChange::new(
            AuthChangeEvent::SignedIn,
            Some(session.clone()),
        ));
        Ok(session)
    }

    async fn sign_out(&self) -> std::result::Result<(), ProviderError> {
        self.record("provider.sign_out");
        if let Some(e) = self.sign_out_error.lock().unwrap().clone() {
            return Err(e);
        }
        *self.persisted.lock().unwrap() = None;
        self.emit(SessionChange::signed_out());
        Ok(())
    }

    async fn refresh_session(&self) -> std::result::Result<Session, ProviderError> {
        let current = self.persisted.lock().unwrap().clone();
        let Some(current) = current else {
            return Err(ProviderError::new("Auth session missing!"));
        };
        let session = self.issue(current.user);
        self.emit(SessionChange::new(
            AuthChangeEvent::TokenRefreshed,
            Some(session.clone()),
        ));
        Ok(session)
    }
}

#[derive(Default)]
pub(crate) struct MockProfileRepository {
    rows: Mutex<HashMap<UserId, UserProfile>>,
    pub(crate) fetch_delay: Mutex<Duration>,
    pub(crate) fail_fetch: AtomicBool,
    pub(crate) fetches: AtomicUsize,
    pub(crate) inserts: AtomicUsize,
    pub(crate) updates: AtomicUsize,
}

impl MockProfileRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn put(&self, profile: UserProfile) {
        self.rows
            .lock()
            .unwrap()
            .insert(profile.id.clone(), profile);
    }

    pub(crate) fn row(&self, user_id: &UserId) -> Option<UserProfile> {
        self.rows.lock().unwrap().get(user_id).cloned()
    }

    pub(crate) fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = delay;
    }
}

#[async_trait]
impl ProfileRepository for MockProfileRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<UserProfile>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.fetch_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(HavenError::network("connection reset"));
        }
        Ok(self.row(user_id))
    }

    async fn insert(&self, profile: &UserProfile) -> Result<UserProfile> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.put(profile.clone());
        Ok(profile.clone())
    }

    async fn update(
        &self,
        user_id: &UserId,
        update: &ProfileUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<UserProfile> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(user_id)
            .ok_or_else(|| HavenError::not_found("UserProfile", user_id.as_str()))?;
        if let Some(full_name) = &update.full_name {
            row.full_name = Some(full_name.clone());
        }
        if let Some(age) = update.age {
            row.age = Some(age);
        }
        if let Some(location) = &update.location {
            row.location = Some(location.clone());
        }
        if let Some(phone) = &update.phone {
            row.phone = Some(phone.clone());
        }
        if let Some(done) = update.onboarding_completed {
            row.onboarding_completed = done;
        }
        row.updated_at = updated_at;
        Ok(row.clone())
    }
}

pub(crate) struct MockStorage {
    values: Mutex<HashMap<String, String>>,
    trace: CallTrace,
}

impl MockStorage {
    pub(crate) fn new(trace: CallTrace) -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            trace,
        }
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.values.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl SecureStorage for MockStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.trace
            .lock()
            .unwrap()
            .push("storage.remove_many".to_string());
        let mut values = self.values.lock().unwrap();
        for key in keys {
            values.remove(*key);
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MockEmergencyRepository {
    pub(crate) services: Mutex<Vec<EmergencyService>>,
    pub(crate) contacts: Mutex<HashMap<UserId, Vec<EmergencyContact>>>,
    pub(crate) logs: Mutex<Vec<NewCallLog>>,
    pub(crate) fail_insert: AtomicBool,
}

#[async_trait]
impl EmergencyRepository for MockEmergencyRepository {
    async fn list_services(&self) -> Result<Vec<EmergencyService>> {
        Ok(self.services.lock().unwrap().clone())
    }

    async fn list_contacts(&self, user_id: &UserId) -> Result<Vec<EmergencyContact>> {
        Ok(self
            .contacts
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_call_log(&self, log: &NewCallLog) -> Result<()> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(HavenError::network("insert rejected"));
        }
        self.logs.lock().unwrap().push(log.clone());
        Ok(())
    }

    async fn list_call_logs(&self, user_id: &UserId, limit: usize) -> Result<Vec<CallLog>> {
        let logs = self.logs.lock().unwrap();
        let mut rows: Vec<CallLog> = logs
            .iter()
            .filter(|log| &log.user_id == user_id)
            .map(|log| CallLog {
                id: log.id.clone(),
                contact_type: log.contact_type,
                contact_name: log.contact_name.clone(),
                phone_number: log.phone_number.clone(),
                call_status: log.call_status,
                call_duration: 0,
                emergency_context: serde_json::to_value(&log.emergency_context)
                    .unwrap_or_default(),
                called_at: log.called_at,
            })
            .collect();
        rows.sort_by(|a, b| b.called_at.cmp(&a.called_at));
        rows.truncate(limit);
        Ok(rows)
    }
}

#[derive(Default)]
pub(crate) struct MockDialer {
    pub(crate) dialed: Mutex<Vec<(String, tokio::time::Instant)>>,
    pub(crate) unreachable: Mutex<HashSet<String>>,
}

impl MockDialer {
    pub(crate) fn numbers(&self) -> Vec<String> {
        self.dialed
            .lock()
            .unwrap()
            .iter()
            .map(|(number, _)| number.clone())
            .collect()
    }
}

#[async_trait]
impl Dialer for MockDialer {
    async fn open_call(&self, phone_number: &str) -> Result<()> {
        if self.unreachable.lock().unwrap().contains(phone_number) {
            return Err(HavenError::Dialer(format!(
                "no handler for tel:{}",
                phone_number
            )));
        }
        self.dialed
            .lock()
            .unwrap()
            .push((phone_number.to_string(), tokio::time::Instant::now()));
        Ok(())
    }
}
