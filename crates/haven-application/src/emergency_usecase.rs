//! Emergency calling use case.
//!
//! Coordinates the emergency repository, the device dialer and the current
//! session: every call attempt is logged for the signed-in user before the
//! dialer opens.

use chrono::Utc;
use haven_core::auth::UserId;
use haven_core::dialer::Dialer;
use haven_core::emergency::{
    CallLog, CallStats, CallStatus, ContactType, DEFAULT_HISTORY_LIMIT, EmergencyContact,
    EmergencyContext, EmergencyRepository, EmergencyService, NewCallLog,
};
use haven_core::error::{HavenError, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::session::SessionManager;

/// Pause between consecutive calls of [`EmergencyUseCase::call_all`].
pub const DEFAULT_CALL_ALL_DELAY: Duration = Duration::from_secs(2);

/// Helplines plus the user's own contacts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmergencyDirectory {
    pub services: Vec<EmergencyService>,
    pub contacts: Vec<EmergencyContact>,
}

/// Newest-first call logs with summary counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallHistory {
    pub logs: Vec<CallLog>,
    pub stats: CallStats,
}

/// Result of dialing one contact during [`EmergencyUseCase::call_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    pub contact_name: String,
    pub phone_number: String,
    pub result: Result<()>,
}

pub struct EmergencyUseCase {
    session: Arc<SessionManager>,
    repository: Arc<dyn EmergencyRepository>,
    dialer: Arc<dyn Dialer>,
    call_all_delay: Duration,
    history_limit: usize,
}

impl EmergencyUseCase {
    pub fn new(
        session: Arc<SessionManager>,
        repository: Arc<dyn EmergencyRepository>,
        dialer: Arc<dyn Dialer>,
    ) -> Self {
        Self {
            session,
            repository,
            dialer,
            call_all_delay: DEFAULT_CALL_ALL_DELAY,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_call_all_delay(mut self, delay: Duration) -> Self {
        self.call_all_delay = delay;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Loads active helplines and, when signed in, the user's active contacts.
    ///
    /// Helplines stay reachable without a session.
    pub async fn load_directory(&self) -> Result<EmergencyDirectory> {
        let Some(user_id) = self.current_user_id() else {
            let services = self.repository.list_services().await?;
            return Ok(EmergencyDirectory {
                services,
                contacts: Vec::new(),
            });
        };

        let (services, contacts) = tokio::try_join!(
            self.repository.list_services(),
            self.repository.list_contacts(&user_id),
        )?;
        tracing::debug!(
            "[Emergency] Loaded {} services and {} contacts",
            services.len(),
            contacts.len()
        );
        Ok(EmergencyDirectory { services, contacts })
    }

    /// Logs the attempt, then opens the dialer.
    ///
    /// A failed log write is not fatal; only a dialer failure is returned.
    pub async fn place_call(
        &self,
        phone_number: &str,
        contact_name: &str,
        contact_type: ContactType,
    ) -> Result<()> {
        match self.current_user_id() {
            Some(user_id) => {
                let log = NewCallLog {
                    id: Uuid::new_v4().to_string(),
                    user_id,
                    contact_type,
                    phone_number: phone_number.to_string(),
                    contact_name: contact_name.to_string(),
                    call_status: CallStatus::Initiated,
                    emergency_context: EmergencyContext::now(),
                    called_at: Utc::now(),
                };
                if let Err(e) = self.repository.insert_call_log(&log).await {
                    tracing::warn!("[Emergency] Failed to log call to {}: {}", contact_name, e);
                }
            }
            None => tracing::debug!("[Emergency] Not signed in, call to {} not logged", contact_name),
        }

        tracing::info!("[Emergency] Calling {} ({})", contact_name, phone_number);
        self.dialer.open_call(phone_number).await.map_err(|e| match e {
            HavenError::Dialer(_) => e,
            other => HavenError::Dialer(other.to_string()),
        })
    }

    /// Dials every active contact in priority order with a pause between calls.
    ///
    /// One failing contact does not stop the rest.
    pub async fn call_all(&self, contacts: &[EmergencyContact]) -> Vec<CallOutcome> {
        let mut ordered: Vec<&EmergencyContact> =
            contacts.iter().filter(|c| c.is_active).collect();
        ordered.sort_by_key(|c| c.priority_order);

        let mut outcomes = Vec::with_capacity(ordered.len());
        for (index, contact) in ordered.into_iter().enumerate() {
            if index > 0 && !self.call_all_delay.is_zero() {
                tokio::time::sleep(self.call_all_delay).await;
            }
            let result = self
                .place_call(&contact.phone_number, &contact.name, ContactType::Buddy)
                .await;
            if let Err(e) = &result {
                tracing::warn!("[Emergency] Call to {} failed: {}", contact.name, e);
            }
            outcomes.push(CallOutcome {
                contact_name: contact.name.clone(),
                phone_number: contact.phone_number.clone(),
                result,
            });
        }
        outcomes
    }

    /// Returns the signed-in user's recent calls.
    pub async fn call_history(&self) -> Result<CallHistory> {
        let user_id = self.current_user_id().ok_or(HavenError::NoSession)?;
        let logs = self
            .repository
            .list_call_logs(&user_id, self.history_limit)
            .await?;
        let stats = CallStats::from_logs(&logs);
        Ok(CallHistory { logs, stats })
    }

    fn current_user_id(&self) -> Option<UserId> {
        self.session.snapshot().user_id().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        CallTrace, MockAuthProvider, MockDialer, MockEmergencyRepository,
        MockProfileRepository, MockStorage, session_for,
    };
    use haven_core::auth::UserIdentity;
    use haven_core::emergency::ServiceType;
    use std::sync::Mutex;
    use std::sync::atomic::Ordering;

    struct Harness {
        usecase: EmergencyUseCase,
        repository: Arc<MockEmergencyRepository>,
        dialer: Arc<MockDialer>,
    }

    async fn harness(signed_in: bool) -> Harness {
        let trace: CallTrace = Arc::new(Mutex::new(Vec::new()));
        let provider = Arc::new(MockAuthProvider::new(trace.clone()));
        if signed_in {
            provider.persist(session_for(
                UserIdentity::new("user-1", "user@example.com"),
                0,
            ));
        }
        let session = Arc::new(SessionManager::new(
            provider,
            Arc::new(MockProfileRepository::new()),
            Arc::new(MockStorage::new(trace)),
        ));
        session.initialize().await;

        let repository = Arc::new(MockEmergencyRepository::default());
        *repository.services.lock().unwrap() = vec![EmergencyService {
            id: "svc-1".to_string(),
            service_name: "Befrienders KL".to_string(),
            phone_number: "03-7627 2929".to_string(),
            service_type: ServiceType::MentalHealth,
            region: None,
            is_active: true,
        }];
        repository
            .contacts
            .lock()
            .unwrap()
            .insert(UserId::new("user-1"), vec![contact("Ibu", "0123456789", 1)]);

        let dialer = Arc::new(MockDialer::default());
        let usecase = EmergencyUseCase::new(session, repository.clone(), dialer.clone());
        Harness {
            usecase,
            repository,
            dialer,
        }
    }

    fn contact(name: &str, phone: &str, priority: i32) -> EmergencyContact {
        EmergencyContact {
            id: format!("contact-{}", name),
            name: name.to_string(),
            phone_number: phone.to_string(),
            relationship: Some("Family".to_string()),
            priority_order: priority,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_load_directory_signed_in() {
        let h = harness(true).await;

        let directory = h.usecase.load_directory().await.unwrap();

        assert_eq!(directory.services.len(), 1);
        assert_eq!(directory.contacts.len(), 1);
        assert_eq!(directory.contacts[0].name, "Ibu");
    }

    #[tokio::test]
    async fn test_load_directory_signed_out_keeps_helplines() {
        let h = harness(false).await;

        let directory = h.usecase.load_directory().await.unwrap();

        assert_eq!(directory.services.len(), 1);
        assert!(directory.contacts.is_empty());
    }

    #[tokio::test]
    async fn test_place_call_logs_then_dials() {
        let h = harness(true).await;

        h.usecase
            .place_call("999", "Police / Ambulance", ContactType::Emergency)
            .await
            .unwrap();

        let logs = h.repository.logs.lock().unwrap().clone();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].user_id, UserId::new("user-1"));
        assert_eq!(logs[0].call_status, CallStatus::Initiated);
        assert_eq!(logs[0].contact_type, ContactType::Emergency);
        assert_eq!(
            logs[0].emergency_context.location,
            EmergencyContext::UNKNOWN_LOCATION
        );
        assert_eq!(h.dialer.numbers(), vec!["999".to_string()]);
    }

    #[tokio::test]
    async fn test_place_call_survives_log_failure() {
        let h = harness(true).await;
        h.repository.fail_insert.store(true, Ordering::SeqCst);

        h.usecase
            .place_call("999", "Police / Ambulance", ContactType::Emergency)
            .await
            .unwrap();

        assert!(h.repository.logs.lock().unwrap().is_empty());
        assert_eq!(h.dialer.numbers().len(), 1);
    }

    #[tokio::test]
    async fn test_place_call_without_session_still_dials() {
        let h = harness(false).await;

        h.usecase
            .place_call("999", "Police / Ambulance", ContactType::Emergency)
            .await
            .unwrap();

        assert!(h.repository.logs.lock().unwrap().is_empty());
        assert_eq!(h.dialer.numbers().len(), 1);
    }

    #[tokio::test]
    async fn test_place_call_dialer_failure() {
        let h = harness(true).await;
        h.dialer.unreachable.lock().unwrap().insert("999".to_string());

        let err = h
            .usecase
            .place_call("999", "Police / Ambulance", ContactType::Emergency)
            .await
            .unwrap_err();

        assert!(matches!(err, HavenError::Dialer(_)));
        // The attempt is logged before dialing.
        assert_eq!(h.repository.logs.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_all_in_priority_order_with_delay() {
        let h = harness(true).await;
        let mut inactive = contact("Old Friend", "0170000000", 0);
        inactive.is_active = false;
        let contacts = vec![
            contact("Abang", "0112222333", 2),
            inactive,
            contact("Ibu", "0123456789", 1),
            contact("Kakak", "0134444555", 3),
        ];
        h.dialer
            .unreachable
            .lock()
            .unwrap()
            .insert("0112222333".to_string());

        let outcomes = h.usecase.call_all(&contacts).await;

        let names: Vec<&str> = outcomes.iter().map(|o| o.contact_name.as_str()).collect();
        assert_eq!(names, vec!["Ibu", "Abang", "Kakak"]);
        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1].result.is_err());
        assert!(outcomes[2].result.is_ok());

        let dialed = h.dialer.dialed.lock().unwrap().clone();
        assert_eq!(dialed.len(), 2);
        assert!(dialed[1].1 - dialed[0].1 >= DEFAULT_CALL_ALL_DELAY * 2);

        let logs = h.repository.logs.lock().unwrap().clone();
        assert_eq!(logs.len(), 3);
        assert!(logs.iter().all(|log| log.contact_type == ContactType::Buddy));
    }

    #[tokio::test]
    async fn test_call_history() {
        let h = harness(true).await;
        h.usecase
            .place_call("999", "Police / Ambulance", ContactType::Emergency)
            .await
            .unwrap();
        h.usecase
            .place_call("0123456789", "Ibu", ContactType::Buddy)
            .await
            .unwrap();

        let history = h.usecase.with_history_limit(10).call_history().await.unwrap();

        assert_eq!(history.logs.len(), 2);
        assert_eq!(
            history.stats,
            CallStats {
                total: 2,
                emergency: 1,
                buddy: 1
            }
        );
    }

    #[tokio::test]
    async fn test_call_history_requires_session() {
        let h = harness(false).await;

        let err = h.usecase.call_history().await.unwrap_err();

        assert!(err.is_no_session());
    }
}
