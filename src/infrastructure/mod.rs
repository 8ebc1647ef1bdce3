//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic: configuration loading and validation, and logging setup.
//!
//! # Submodules
//!
//! - [`config`] - Configuration loading and validation

pub mod config;
