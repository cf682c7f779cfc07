//! Session application services.
//!
//! This module owns the authentication lifecycle: session recovery,
//! sign-up/in/out, profile loading and the observable auth snapshot.

mod manager;
mod state;
mod worker;

pub use manager::SessionManager;
pub use state::{AuthPhase, AuthSnapshot};
