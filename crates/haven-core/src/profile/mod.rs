//! User profile domain module.

mod model;
mod repository;

pub use model::{ProfilePatch, ProfileUpdate, UserProfile};
pub use repository::ProfileRepository;
