//! Host configuration.
//!
//! Describes the identity of the process hosting plugins and the plugins it
//! should register. Parsed from JSON by the embedding application.

use crate::core::{Result, Scope};
use crate::monitoring::Logger;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Plugin host configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HostConfig {
    /// Hosting context
    pub scope: Scope,
    /// Namespace of the host, e.g. `system.adapter.admin.0`
    pub namespace: String,
    /// Prefix used for log lines of the host
    #[serde(default)]
    pub log_namespace: String,
    /// Configuration of the host, shared with every plugin
    #[serde(default)]
    pub host_config: Value,
    /// Package metadata of the host
    #[serde(default)]
    pub parent_package: Value,
    /// Catalog locations searched when resolving plugin modules
    #[serde(default)]
    pub resolve_hints: Vec<String>,
    /// Plugin name to plugin configuration
    #[serde(default)]
    pub plugins: Map<String, Value>,
}

impl HostConfig {
    /// Config for an adapter instance, e.g. `adapter("admin", 0)`.
    pub fn adapter(name: &str, instance: u32) -> Self {
        Self {
            scope: Scope::Adapter,
            namespace: format!("system.adapter.{}.{}", name, instance),
            log_namespace: format!("{}.{}", name, instance),
            host_config: Value::Object(Map::new()),
            parent_package: serde_json::json!({ "common": { "name": name } }),
            resolve_hints: Vec::new(),
            plugins: Map::new(),
        }
    }

    /// Config for the controller running on `host`.
    pub fn controller(host: &str) -> Self {
        Self {
            scope: Scope::Controller,
            namespace: format!("system.host.{}", host),
            log_namespace: format!("host.{}", host),
            host_config: Value::Object(Map::new()),
            parent_package: serde_json::json!({ "common": { "host": host } }),
            resolve_hints: Vec::new(),
            plugins: Map::new(),
        }
    }

    /// Parse from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Add a plugin registration.
    pub fn with_plugin(mut self, name: &str, config: Value) -> Self {
        self.plugins.insert(name.to_string(), config);
        self
    }

    /// Add a catalog location to search.
    pub fn with_resolve_hint(mut self, hint: &str) -> Self {
        self.resolve_hints.push(hint.to_string());
        self
    }

    /// Build the runtime host settings.
    pub fn settings(&self, logger: Logger) -> HostSettings {
        HostSettings {
            scope: self.scope,
            namespace: self.namespace.clone(),
            log_namespace: self.log_namespace.clone(),
            logger,
            host_config: self.host_config.clone(),
            parent_package: self.parent_package.clone(),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::controller("localhost")
    }
}

/// Identity of the host, from which every plugin's settings are derived.
#[derive(Clone, Debug)]
pub struct HostSettings {
    /// Hosting context
    pub scope: Scope,
    /// Namespace of the host
    pub namespace: String,
    /// Prefix used for log lines of the host
    pub log_namespace: String,
    /// Host logger
    pub logger: Logger,
    /// Configuration of the host
    pub host_config: Value,
    /// Package metadata of the host
    pub parent_package: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_adapter_config() {
        let config = HostConfig::adapter("admin", 0);
        assert_eq!(config.scope, Scope::Adapter);
        assert_eq!(config.namespace, "system.adapter.admin.0");
        assert_eq!(config.log_namespace, "admin.0");
    }

    #[test]
    fn test_controller_config() {
        let config = HostConfig::controller("pi4");
        assert_eq!(config.scope, Scope::Controller);
        assert_eq!(config.namespace, "system.host.pi4");
        assert_eq!(config.parent_package["common"]["host"], "pi4");
    }

    #[test]
    fn test_from_json_keeps_plugin_order() {
        let config = HostConfig::from_json(
            r#"{
                "scope": "adapter",
                "namespace": "system.adapter.web.1",
                "plugins": { "sentry": {}, "auth": {"enabled": false}, "metrics": {} }
            }"#,
        )
        .unwrap();

        let names: Vec<&String> = config.plugins.keys().collect();
        assert_eq!(names, vec!["sentry", "auth", "metrics"]);
        assert_eq!(config.plugins["auth"], json!({"enabled": false}));
        assert!(config.resolve_hints.is_empty());
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(HostConfig::from_json(r#"{"scope": "daemon"}"#).is_err());
    }

    #[test]
    fn test_from_file_missing() {
        let result = HostConfig::from_file("/nonexistent/plughost.json");
        assert!(matches!(result, Err(crate::core::Error::Io(_))));
    }

    #[test]
    fn test_settings() {
        let config = HostConfig::adapter("admin", 2).with_resolve_hint("builtin");
        let settings = config.settings(Logger::default_logger("admin.2"));
        assert_eq!(settings.namespace, "system.adapter.admin.2");
        assert_eq!(settings.logger.namespace(), "admin.2");
        assert_eq!(config.resolve_hints, vec!["builtin".to_string()]);
    }
}
