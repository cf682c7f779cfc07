//! Application layer for Haven.
//!
//! This crate provides use case implementations that coordinate between
//! domain and infrastructure layers: the session manager that owns the
//! authentication lifecycle, and the emergency calling use case.

pub mod emergency_usecase;
pub mod session;

#[cfg(test)]
mod test_support;

pub use emergency_usecase::{CallHistory, CallOutcome, EmergencyDirectory, EmergencyUseCase};
pub use session::{AuthPhase, AuthSnapshot, SessionManager};
