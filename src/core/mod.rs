//! Core utilities and common types for the plugin host.

pub mod config;
pub mod error;
pub mod types;

pub use config::{HostConfig, HostSettings};
pub use error::{Error, Result};
pub use types::*;
