//! Emergency data repository trait.

use async_trait::async_trait;

use super::model::{CallLog, EmergencyContact, EmergencyService, NewCallLog};
use crate::auth::UserId;
use crate::error::Result;

/// Repository for emergency services, contacts and call logs.
#[async_trait]
pub trait EmergencyRepository: Send + Sync {
    /// Active services, ordered by service type.
    async fn list_services(&self) -> Result<Vec<EmergencyService>>;

    /// The user's active contacts, ordered by priority.
    async fn list_contacts(&self, user_id: &UserId) -> Result<Vec<EmergencyContact>>;

    async fn insert_call_log(&self, log: &NewCallLog) -> Result<()>;

    /// Newest-first call logs, at most `limit`.
    async fn list_call_logs(&self, user_id: &UserId, limit: usize) -> Result<Vec<CallLog>>;
}
