//! Monitoring Module
//!
//! Provides observability for the plugin host:
//! - Namespaced logger adapter
//! - Tracing subscriber setup

pub mod logging;
pub mod tracing;

pub use logging::{LogEntry, LogLevel, Logger, LoggerConfig};
pub use self::tracing::setup_tracing;
