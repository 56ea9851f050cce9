//! Error types for the plugin host.

use thiserror::Error;

/// Result type alias for plugin host operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while hosting plugins.
#[derive(Error, Debug)]
pub enum Error {
    // Resolution errors
    #[error("Plugin module not found: {0}")]
    PluginNotFound(String),

    #[error("Plugin construction failed: {0}")]
    Construction(String),

    // Lifecycle errors
    #[error("Plugin not initialized: {0}")]
    NotInitialized(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Returned by a plugin's own init hook to refuse starting.
    #[error("Plugin initialization failed: {0}")]
    InitFailed(String),

    #[error("Plugin panicked: {0}")]
    PluginPanicked(String),

    #[error("Plugin already destroyed: {0}")]
    Destroyed(String),

    // Configuration errors
    #[error("Invalid plugin configuration: {0}")]
    InvalidConfig(String),

    // Persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotInitialized("system.adapter.admin.0.plugins.sentry".to_string());
        assert_eq!(
            err.to_string(),
            "Plugin not initialized: system.adapter.admin.0.plugins.sentry"
        );
    }

    #[test]
    fn test_from_serde_json() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
