//! Application configuration model (`config.toml`).

use serde::{Deserialize, Serialize};

/// Root configuration structure for config.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RootConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub emergency: EmergencySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Hosted backend project settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://xyzcompany.supabase.co`
    #[serde(default)]
    pub url: String,
    /// Public anon key sent as `apikey` on every request
    #[serde(default)]
    pub anon_key: String,
}

impl BackendConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Refresh an expiring persisted session when it is recovered.
    #[serde(default = "default_true")]
    pub auto_refresh_token: bool,
    /// Persist the session in secure storage between runs.
    #[serde(default = "default_true")]
    pub persist_session: bool,
    /// A session expiring within this many seconds counts as expiring.
    #[serde(default = "default_refresh_margin_secs")]
    pub refresh_margin_secs: i64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            auto_refresh_token: true,
            persist_session: true,
            refresh_margin_secs: default_refresh_margin_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencySettings {
    /// Pause between consecutive calls when calling every contact.
    #[serde(default = "default_call_all_delay_ms")]
    pub call_all_delay_ms: u64,
    /// Program used to open `tel:` URIs.
    #[serde(default)]
    pub dialer_command: Option<String>,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for EmergencySettings {
    fn default() -> Self {
        Self {
            call_all_delay_ms: default_call_all_delay_ms(),
            dialer_command: None,
            history_limit: default_history_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default tracing filter directive; `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_refresh_margin_secs() -> i64 {
    60
}

fn default_call_all_delay_ms() -> u64 {
    2000
}

fn default_history_limit() -> usize {
    crate::emergency::DEFAULT_HISTORY_LIMIT
}

fn default_log_level() -> String {
    "info".to_string()
}
