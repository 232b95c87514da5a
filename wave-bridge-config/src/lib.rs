//! Configuration system for wave-bridge.
//!
//! This crate provides configuration loading, saving, and default values
//! for the viewer bridge. It includes:
//!
//! - The [`BridgeConfig`] struct and its YAML persistence
//! - Default values for every field
//! - The [`LogLevel`] setting consumed by the debug logger
//! - Typed [`ConfigError`] variants

pub mod config;
pub mod defaults;
pub mod error;
mod types;

pub use config::BridgeConfig;
pub use error::ConfigError;
pub use types::LogLevel;
