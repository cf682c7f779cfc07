//! Row repositories over the hosted REST endpoint.
//!
//! Filters follow the `column=eq.value` query convention. Requests that
//! must return the written row ask for it with `Prefer: return=representation`
//! and a single-object `Accept` header.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use haven_core::auth::UserId;
use haven_core::emergency::{
    CallLog, EmergencyContact, EmergencyRepository, EmergencyService, NewCallLog,
};
use haven_core::error::{HavenError, ProviderError, Result};
use haven_core::profile::{ProfilePatch, ProfileRepository, ProfileUpdate, UserProfile};
use reqwest::{Method, RequestBuilder};

use super::client::BackendClient;

const PROFILES_TABLE: &str = "user_profiles";
const SERVICES_TABLE: &str = "emergency_services";
const CONTACTS_TABLE: &str = "emergency_contacts";
const CALL_LOGS_TABLE: &str = "call_logs";

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_REPRESENTATION: &str = "return=representation";
const RETURN_MINIMAL: &str = "return=minimal";

/// Status returned when a single-object request matched no rows.
const NOT_ACCEPTABLE: u16 = 406;

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

/// Profile rows keyed by auth user id.
pub struct RestProfileRepository {
    client: BackendClient,
}

impl RestProfileRepository {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    async fn find_request(&self, user_id: &UserId) -> RequestBuilder {
        self.client
            .request(Method::GET, &self.client.rest_url(PROFILES_TABLE))
            .await
            .query(&[("id", eq(user_id)), ("select", "*".to_string())])
    }

    async fn update_request(
        &self,
        user_id: &UserId,
        update: &ProfileUpdate,
        updated_at: DateTime<Utc>,
    ) -> RequestBuilder {
        self.client
            .request(Method::PATCH, &self.client.rest_url(PROFILES_TABLE))
            .await
            .query(&[("id", eq(user_id))])
            .header("Prefer", RETURN_REPRESENTATION)
            .header("Accept", SINGLE_OBJECT)
            .json(&ProfilePatch { update, updated_at })
    }
}

#[async_trait]
impl ProfileRepository for RestProfileRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<UserProfile>> {
        let request = self.find_request(user_id).await;
        let rows: Vec<UserProfile> = self.client.send_json(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, profile: &UserProfile) -> Result<UserProfile> {
        let request = self
            .client
            .request(Method::POST, &self.client.rest_url(PROFILES_TABLE))
            .await
            .header("Prefer", RETURN_REPRESENTATION)
            .header("Accept", SINGLE_OBJECT)
            .json(profile);
        Ok(self.client.send_json(request).await?)
    }

    async fn update(
        &self,
        user_id: &UserId,
        update: &ProfileUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<UserProfile> {
        let request = self.update_request(user_id, update, updated_at).await;
        self.client
            .send_json(request)
            .await
            .map_err(|e| not_found_or_network(e, "UserProfile", user_id))
    }
}

fn not_found_or_network(e: ProviderError, entity_type: &'static str, id: &UserId) -> HavenError {
    if e.status == Some(NOT_ACCEPTABLE) {
        HavenError::not_found(entity_type, id.as_str())
    } else {
        e.into()
    }
}

/// Helplines, personal contacts and call logs.
pub struct RestEmergencyRepository {
    client: BackendClient,
}

impl RestEmergencyRepository {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    async fn services_request(&self) -> RequestBuilder {
        self.client
            .request(Method::GET, &self.client.rest_url(SERVICES_TABLE))
            .await
            .query(&[
                ("select", "*"),
                ("is_active", "eq.true"),
                ("order", "service_type"),
            ])
    }

    async fn contacts_request(&self, user_id: &UserId) -> RequestBuilder {
        self.client
            .request(Method::GET, &self.client.rest_url(CONTACTS_TABLE))
            .await
            .query(&[
                ("select", "*".to_string()),
                ("user_id", eq(user_id)),
                ("is_active", "eq.true".to_string()),
                ("order", "priority_order".to_string()),
            ])
    }

    async fn call_logs_request(&self, user_id: &UserId, limit: usize) -> RequestBuilder {
        self.client
            .request(Method::GET, &self.client.rest_url(CALL_LOGS_TABLE))
            .await
            .query(&[
                ("select", "*".to_string()),
                ("user_id", eq(user_id)),
                ("order", "called_at.desc".to_string()),
                ("limit", limit.to_string()),
            ])
    }
}

#[async_trait]
impl EmergencyRepository for RestEmergencyRepository {
    async fn list_services(&self) -> Result<Vec<EmergencyService>> {
        let request = self.services_request().await;
        Ok(self.client.send_json(request).await?)
    }

    async fn list_contacts(&self, user_id: &UserId) -> Result<Vec<EmergencyContact>> {
        let request = self.contacts_request(user_id).await;
        Ok(self.client.send_json(request).await?)
    }

    async fn insert_call_log(&self, log: &NewCallLog) -> Result<()> {
        let request = self
            .client
            .request(Method::POST, &self.client.rest_url(CALL_LOGS_TABLE))
            .await
            .header("Prefer", RETURN_MINIMAL)
            .json(log);
        Ok(self.client.send_empty(request).await?)
    }

    async fn list_call_logs(&self, user_id: &UserId, limit: usize) -> Result<Vec<CallLog>> {
        let request = self.call_logs_request(user_id, limit).await;
        Ok(self.client.send_json(request).await?)
    }
}
