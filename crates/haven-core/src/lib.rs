pub mod auth;
pub mod config;
pub mod dialer;
pub mod emergency;
pub mod error;
pub mod profile;
pub mod storage;
pub mod validation;

// Re-export common error type
pub use error::{HavenError, ProviderError};
