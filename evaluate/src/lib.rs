pub mod cache;
pub mod compatibility;
pub mod config;
pub mod error;
pub mod manager;
pub mod pass;
pub mod scorer;
