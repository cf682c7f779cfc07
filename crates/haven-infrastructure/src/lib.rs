//! Infrastructure layer for Haven.
//!
//! Implementations of the core traits: file-based config and secure storage,
//! the hosted backend adapters, and the command dialer.

pub mod backend;
pub mod config_service;
pub mod dialer;
pub mod paths;
pub mod secure_storage;

pub use backend::{BackendClient, RestEmergencyRepository, RestProfileRepository, SupabaseAuth};
pub use config_service::ConfigService;
pub use dialer::CommandDialer;
pub use paths::HavenPaths;
pub use secure_storage::{FileSecureStorage, MemorySecureStorage};
