//! Authentication domain module.
//!
//! # Module Structure
//!
//! - `model`: session, identity and change-notification types
//! - `messages`: provider message to user-facing text mapping
//! - `provider`: the remote auth provider trait

mod messages;
mod model;
mod provider;

pub use messages::{UNEXPECTED_ERROR_MESSAGE, friendly_message};
pub use model::{
    AuthChangeEvent, Credentials, Session, SessionChange, SignUpOutcome, UserId, UserIdentity,
};
pub use provider::AuthProvider;
