//! Hosted backend adapters.
//!
//! # Module Structure
//!
//! - `client`: authorized HTTP client and error extraction
//! - `dto`: auth endpoint wire shapes
//! - `auth`: [`SupabaseAuth`], the auth provider
//! - `rest`: profile and emergency row repositories

mod auth;
mod client;
mod dto;
mod rest;

pub use auth::SupabaseAuth;
pub use client::BackendClient;
pub use rest::{RestEmergencyRepository, RestProfileRepository};
