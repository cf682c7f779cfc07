use anyhow::{Context, Result};
use chrono::Utc;
use clap::Subcommand;
use haven_core::emergency::{ContactType, format_duration, format_relative, format_time};
use haven_infrastructure::ConfigService;

use super::context::AppContext;

#[derive(Subcommand)]
pub enum EmergencyAction {
    /// List helplines and, when signed in, your emergency contacts
    List,
    /// Call a number; the attempt is logged when signed in
    Call {
        phone_number: String,
        /// Name recorded in the call log
        #[arg(long, default_value = "Emergency Service")]
        name: String,
        /// Record the call as a personal contact call
        #[arg(long)]
        buddy: bool,
    },
    /// Call every active contact in priority order
    CallAll,
    /// Show recent calls
    History,
}

pub async fn run(action: EmergencyAction, config_service: &ConfigService) -> Result<()> {
    let ctx = AppContext::connect(config_service).await?;
    let emergency = ctx.emergency();

    match action {
        EmergencyAction::List => {
            let directory = emergency.load_directory().await?;
            println!("Helplines:");
            for service in &directory.services {
                println!(
                    "  {:<32} {:<16} {}",
                    service.service_name,
                    service.phone_number,
                    service.service_type.label()
                );
            }
            if !directory.contacts.is_empty() {
                println!("Contacts:");
                for contact in &directory.contacts {
                    println!(
                        "  {}. {:<29} {:<16} {}",
                        contact.priority_order,
                        contact.name,
                        contact.phone_number,
                        contact.relationship.as_deref().unwrap_or("")
                    );
                }
            }
        }
        EmergencyAction::Call {
            phone_number,
            name,
            buddy,
        } => {
            let contact_type = if buddy {
                ContactType::Buddy
            } else {
                ContactType::Emergency
            };
            emergency
                .place_call(&phone_number, &name, contact_type)
                .await
                .context("Phone calling is not supported on this device")?;
            println!("Calling {} ({})", name, phone_number);
        }
        EmergencyAction::CallAll => {
            ctx.require_session()?;
            let directory = emergency.load_directory().await?;
            if directory.contacts.is_empty() {
                println!("No emergency contacts");
            }
            for outcome in emergency.call_all(&directory.contacts).await {
                match outcome.result {
                    Ok(()) => println!("Called {} ({})", outcome.contact_name, outcome.phone_number),
                    Err(e) => println!("Failed {} ({}): {}", outcome.contact_name, outcome.phone_number, e),
                }
            }
        }
        EmergencyAction::History => {
            ctx.require_session()?;
            let history = emergency.call_history().await?;
            println!(
                "Total {}  Emergency {}  Contacts {}",
                history.stats.total, history.stats.emergency, history.stats.buddy
            );
            let now = Utc::now();
            for log in &history.logs {
                let kind = match log.contact_type {
                    ContactType::Emergency => "Emergency Service",
                    ContactType::Buddy => "Emergency Contact",
                };
                println!(
                    "  {:<24} {:<16} {:<18} {} {}  {}",
                    log.contact_name,
                    log.phone_number,
                    kind,
                    format_relative(log.called_at, now),
                    format_time(log.called_at),
                    format_duration(log.call_duration)
                );
            }
        }
    }

    ctx.session.shutdown();
    Ok(())
}
