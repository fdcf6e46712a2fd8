//! Shared utilities, configuration, and error handling for EduArt
//!
//! This crate provides common functionality used across the workspace:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - The user role that scopes every saved artifact

pub mod config;
pub mod error;
pub mod role;

pub use config::{Config, ThemePreference};
pub use error::{Error, Result};
pub use role::UserRole;
