pub mod config;
pub mod definition;
pub mod error;
pub mod types;
