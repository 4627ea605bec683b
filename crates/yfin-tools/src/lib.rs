//! Tool management and execution framework for yfin
//!
//! This crate provides a framework for defining and executing tools (functions)
//! that callers can bind in-process, without going through a protocol server.

pub mod error;
pub mod registry;
pub mod schema;
pub mod tool;

pub use error::{Error, Result};
pub use registry::ToolRegistry;
pub use tool::Tool;
