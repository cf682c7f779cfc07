pub mod account;
pub mod config;
pub mod context;
pub mod emergency;
pub mod validate;
