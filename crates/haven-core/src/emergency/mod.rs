//! Emergency calling domain module.
//!
//! # Module Structure
//!
//! - `model`: services, contacts and call logs
//! - `repository`: row access trait
//! - `history`: call history statistics and formatting

mod history;
mod model;
mod repository;

pub use history::{
    CallStats, DEFAULT_HISTORY_LIMIT, format_duration, format_relative, format_time,
};
pub use model::{
    CallLog, CallStatus, ContactType, EmergencyContact, EmergencyContext, EmergencyService,
    NewCallLog, ServiceType,
};
pub use repository::EmergencyRepository;
