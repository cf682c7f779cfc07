//! Dialer that hands `tel:` URIs to a desktop opener program.

use async_trait::async_trait;
use haven_core::dialer::{Dialer, tel_uri};
use haven_core::error::{HavenError, Result};
use tokio::process::Command;

#[cfg(target_os = "macos")]
const DEFAULT_OPENER: &str = "open";
#[cfg(not(target_os = "macos"))]
const DEFAULT_OPENER: &str = "xdg-open";

/// Launches `<program> tel:<number>` and waits for the opener to exit.
#[derive(Debug, Clone)]
pub struct CommandDialer {
    program: String,
}

impl CommandDialer {
    /// Uses `program`, or the platform opener when `None`.
    pub fn new(program: Option<String>) -> Self {
        Self {
            program: program
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_OPENER.to_string()),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl Dialer for CommandDialer {
    async fn open_call(&self, phone_number: &str) -> Result<()> {
        let uri = tel_uri(phone_number);
        tracing::debug!("[Dialer] {} {}", self.program, uri);

        let status = Command::new(&self.program)
            .arg(&uri)
            .status()
            .await
            .map_err(|e| HavenError::Dialer(format!("Failed to launch {}: {}", self.program, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(HavenError::Dialer(format!(
                "{} exited with {} for {}",
                self.program, status, uri
            )))
        }
    }
}
