//! Shared utilities for yfin
//!
//! This crate provides common functionality used across the yfin workspace:
//! tracing setup and helpers for reading configuration from the environment.

pub mod config;
pub mod logging;

pub use config::{ConfigError, env_parse, env_string};
pub use logging::{LogConfig, LogFormat, LogTarget, init_tracing};
