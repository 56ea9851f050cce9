//! Namespaced logging for the plugin host.
//!
//! A [`Logger`] prefixes every message with its namespace, forwards it to
//! `tracing` and keeps the most recent entries in a buffer that is shared by
//! all child loggers, so hosts and tests can inspect what plugins reported.

use crate::core::{now, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level (most verbose)
    Trace = 0,
    /// Debug level
    Debug = 1,
    /// Info level
    Info = 2,
    /// Warning level
    Warn = 3,
    /// Error level
    Error = 4,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// A structured log entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogEntry {
    /// Timestamp
    pub timestamp: Timestamp,
    /// Log level
    pub level: LogLevel,
    /// Message, without the namespace prefix
    pub message: String,
    /// Namespace of the emitting logger
    pub namespace: String,
    /// Structured fields
    pub fields: HashMap<String, serde_json::Value>,
}

impl LogEntry {
    /// Create a new log entry.
    pub fn new(level: LogLevel, namespace: &str, message: &str) -> Self {
        Self {
            timestamp: now(),
            level,
            message: message.to_string(),
            namespace: namespace.to_string(),
            fields: HashMap::new(),
        }
    }

    /// Add a field.
    pub fn with_field(mut self, key: &str, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.fields.insert(key.to_string(), v);
        }
        self
    }

    /// Message with the namespace prefix applied.
    pub fn prefixed(&self) -> String {
        if self.namespace.is_empty() {
            self.message.clone()
        } else {
            format!("{} {}", self.namespace, self.message)
        }
    }

    /// Format as text.
    pub fn to_text(&self) -> String {
        let fields_str = if self.fields.is_empty() {
            String::new()
        } else {
            format!(" {:?}", self.fields)
        };

        format!(
            "{} {} {}{}",
            self.timestamp,
            self.level,
            self.prefixed(),
            fields_str
        )
    }
}

/// Logger configuration.
#[derive(Clone, Debug)]
pub struct LoggerConfig {
    /// Minimum log level
    pub level: LogLevel,
    /// Maximum number of buffered entries
    pub max_buffer: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            max_buffer: 1000,
        }
    }
}

/// Namespaced logger.
///
/// Cloning is cheap; clones and children share one buffer.
#[derive(Clone, Debug)]
pub struct Logger {
    /// Namespace prefix
    namespace: String,
    /// Configuration
    config: LoggerConfig,
    /// Shared log buffer (for inspection)
    buffer: Arc<RwLock<VecDeque<LogEntry>>>,
}

impl Logger {
    /// Create a new logger.
    pub fn new(namespace: &str, config: LoggerConfig) -> Self {
        Self {
            namespace: namespace.to_string(),
            config,
            buffer: Arc::new(RwLock::new(VecDeque::new())),
        }
    }

    /// Create with default config.
    pub fn default_logger(namespace: &str) -> Self {
        Self::new(namespace, LoggerConfig::default())
    }

    /// Create a logger with another namespace sharing this logger's buffer.
    pub fn child(&self, namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            config: self.config.clone(),
            buffer: Arc::clone(&self.buffer),
        }
    }

    /// Get the namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Log an entry.
    pub fn log(&self, entry: LogEntry) {
        if entry.level < self.config.level {
            return;
        }

        let line = entry.prefixed();
        match entry.level {
            LogLevel::Trace => tracing::trace!("{}", line),
            LogLevel::Debug => tracing::debug!("{}", line),
            LogLevel::Info => tracing::info!("{}", line),
            LogLevel::Warn => tracing::warn!("{}", line),
            LogLevel::Error => tracing::error!("{}", line),
        }

        let mut buffer = self.buffer.write().unwrap_or_else(|e| e.into_inner());
        if buffer.len() >= self.config.max_buffer {
            buffer.pop_front();
        }
        buffer.push_back(entry);
    }

    /// Log at trace level.
    pub fn trace(&self, message: &str) {
        self.log(LogEntry::new(LogLevel::Trace, &self.namespace, message));
    }

    /// Log at debug level.
    pub fn debug(&self, message: &str) {
        self.log(LogEntry::new(LogLevel::Debug, &self.namespace, message));
    }

    /// Log at info level.
    pub fn info(&self, message: &str) {
        self.log(LogEntry::new(LogLevel::Info, &self.namespace, message));
    }

    /// Log at warn level.
    pub fn warn(&self, message: &str) {
        self.log(LogEntry::new(LogLevel::Warn, &self.namespace, message));
    }

    /// Log at error level.
    pub fn error(&self, message: &str) {
        self.log(LogEntry::new(LogLevel::Error, &self.namespace, message));
    }

    /// Get buffered logs.
    pub fn get_logs(&self) -> Vec<LogEntry> {
        self.buffer
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    /// Get logs at or above a level.
    pub fn get_logs_at_level(&self, min_level: LogLevel) -> Vec<LogEntry> {
        self.buffer
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|e| e.level >= min_level)
            .cloned()
            .collect()
    }

    /// Clear the buffer.
    pub fn clear(&self) {
        self.buffer.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Set log level.
    pub fn set_level(&mut self, level: LogLevel) {
        self.config.level = level;
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::default_logger("")
    }
}
