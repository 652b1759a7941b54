//! Shared configuration and error handling for Lifelog
//!
//! This crate provides common functionality used across the Lifelog auth
//! service:
//! - Configuration management following 12-factor principles
//! - Error types and handling

pub mod config;
pub mod error;
pub mod wire;

pub use config::Config;
pub use error::{Error, Result};
