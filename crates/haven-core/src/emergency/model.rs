//! Emergency directory and call log models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;

/// Category of an official emergency line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Emergency,
    Medical,
    MentalHealth,
    #[serde(other)]
    Other,
}

impl ServiceType {
    /// Upper-case label used in listings, e.g. `MENTAL HEALTH`.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::Emergency => "EMERGENCY",
            ServiceType::Medical => "MEDICAL",
            ServiceType::MentalHealth => "MENTAL HEALTH",
            ServiceType::Other => "OTHER",
        }
    }
}

/// An official emergency or crisis helpline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyService {
    pub id: String,
    pub service_name: String,
    pub phone_number: String,
    pub service_type: ServiceType,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// A personal emergency contact, dialed in `priority_order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: String,
    pub name: String,
    pub phone_number: String,
    #[serde(default)]
    pub relationship: Option<String>,
    pub priority_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Who was called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactType {
    /// An official service line
    Emergency,
    /// A personal contact
    Buddy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Initiated,
    Answered,
    Missed,
    Failed,
}

/// Context attached to every logged call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyContext {
    pub timestamp: DateTime<Utc>,
    pub location: String,
}

impl EmergencyContext {
    pub const UNKNOWN_LOCATION: &'static str = "Unknown";

    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            location: Self::UNKNOWN_LOCATION.to_string(),
        }
    }
}

/// A call log row as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallLog {
    pub id: String,
    pub contact_type: ContactType,
    pub contact_name: String,
    pub phone_number: String,
    pub call_status: CallStatus,
    #[serde(default)]
    pub call_duration: u32,
    #[serde(default)]
    pub emergency_context: serde_json::Value,
    pub called_at: DateTime<Utc>,
}

/// Insert payload for a call log row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCallLog {
    pub id: String,
    pub user_id: UserId,
    pub contact_type: ContactType,
    pub phone_number: String,
    pub contact_name: String,
    pub call_status: CallStatus,
    pub emergency_context: EmergencyContext,
    pub called_at: DateTime<Utc>,
}
