//! Plugin interface definition.
//!
//! Defines the hooks plugins implement, the identity bundle they are
//! constructed from and the configuration they receive.

use crate::core::{Error, Result, Scope};
use crate::monitoring::Logger;
use crate::plugin::base::PluginBase;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Configuration of a single plugin.
///
/// An opaque JSON object handed to the plugin unchanged, except for the
/// `enabled` field which the host overwrites with the resolved state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginConfig(Map<String, Value>);

impl PluginConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value. `null` is treated as an empty object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(Error::InvalidConfig(format!(
                "expected an object, got {}",
                other
            ))),
        }
    }

    /// Static default for the enabled flag: true unless explicitly `false`.
    pub fn default_enabled(&self) -> bool {
        !matches!(self.0.get("enabled"), Some(Value::Bool(false)))
    }

    /// Raw `enabled` field, if it is a boolean.
    pub fn enabled(&self) -> Option<bool> {
        self.0.get("enabled").and_then(Value::as_bool)
    }

    /// Inject the resolved enabled state.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.0.insert("enabled".to_string(), Value::Bool(enabled));
    }

    /// Get config value.
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.0
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set config value.
    pub fn set(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    /// Underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Identity bundle a plugin is constructed from.
#[derive(Clone, Debug)]
pub struct PluginSettings {
    /// Registered plugin name
    pub name: String,
    /// Hosting context
    pub scope: Scope,
    /// Namespace of the plugin, `<host namespace>.plugins.<name>`
    pub namespace: String,
    /// Namespace of the host
    pub parent_namespace: String,
    /// Prefix for log lines
    pub log_namespace: String,
    /// Logger prefixed with `log_namespace`
    pub logger: Logger,
    /// Configuration of the host
    pub host_config: Value,
    /// Package metadata of the host
    pub parent_package: Value,
}

/// Hooks every plugin implements.
///
/// Both hooks receive the plugin's [`PluginBase`], which gives access to the
/// logger and the bound persistence services.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Start the plugin's business logic.
    ///
    /// Only called when the plugin resolved as enabled. Returning an error
    /// deactivates the plugin and makes the host evict it.
    async fn init(&mut self, base: &PluginBase, _config: &PluginConfig) -> Result<()> {
        Err(Error::NotImplemented(format!("{}: init", base.namespace())))
    }

    /// Release the plugin's resources.
    ///
    /// Returns whether teardown succeeded.
    async fn destroy(&mut self, _base: &PluginBase) -> bool {
        true
    }
}

/// Constructor of a plugin.
pub type PluginFactory = Arc<dyn Fn(&PluginSettings) -> Result<Box<dyn Plugin>> + Send + Sync>;
