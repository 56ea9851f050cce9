//! Enabled-state resolution.
//!
//! Decides whether a plugin should start, in priority order:
//!
//! 1. the plugin's own persisted `<namespace>.enabled` flag,
//! 2. for adapter-hosted plugins, the same flag below the host's namespace
//!    (`system.host.<host>.…`), read but never copied,
//! 3. the static `enabled` field of the plugin configuration, `true` unless
//!    explicitly `false`.
//!
//! Persistence faults never abort resolution: a failed upsert of the state
//! objects is logged and read failures count as an absent flag. Only an
//! unbound base is rejected.

use crate::core::{Error, Result, Scope};
use crate::plugin::base::PluginBase;
use crate::plugin::interface::PluginConfig;
use regex::{NoExpand, Regex};
use serde_json::{json, Value};
use tracing::debug;

/// Where a resolved enabled state came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnabledSource {
    /// The plugin's own persisted flag
    Persisted,
    /// The host-level persisted flag
    Host,
    /// The plugin configuration
    ConfigDefault,
}

/// Outcome of enabled-state resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Whether the plugin should be activated
    pub activate: bool,
    /// Which tier decided
    pub source: EnabledSource,
}

/// Resolve whether the plugin behind `base` should be activated.
///
/// `parent` is the host's package configuration; its `common.host` entry
/// enables the host-level tier for adapter-hosted plugins.
pub async fn resolve_enabled(
    base: &PluginBase,
    config: &PluginConfig,
    parent: &Value,
) -> Result<Resolution> {
    if !base.lifecycle().is_bound() {
        return Err(Error::NotInitialized(base.namespace().to_string()));
    }
    if let Err(e) = ensure_enabled_object(base).await {
        base.logger()
            .warn(&format!("Could not create enabled state objects: {}", e));
    }

    let resolution = if let Some(activate) = read_flag(base, &base.enabled_id()).await {
        Resolution {
            activate,
            source: EnabledSource::Persisted,
        }
    } else if let Some(activate) = read_host_flag(base, parent).await {
        Resolution {
            activate,
            source: EnabledSource::Host,
        }
    } else {
        Resolution {
            activate: config.default_enabled(),
            source: EnabledSource::ConfigDefault,
        }
    };

    debug!(
        namespace = %base.namespace(),
        activate = resolution.activate,
        source = ?resolution.source,
        "enabled state resolved"
    );
    Ok(resolution)
}

/// Upsert the plugin folder and its `enabled` state definition.
async fn ensure_enabled_object(base: &PluginBase) -> Result<()> {
    base.extend_object(
        base.namespace(),
        json!({
            "type": "folder",
            "common": { "name": format!("{} Plugin States", base.name()) },
            "native": {}
        }),
    )
    .await?;

    base.extend_object(
        &base.enabled_id(),
        json!({
            "type": "state",
            "common": {
                "name": format!("{} Plugin - enabled", base.name()),
                "type": "boolean",
                "read": true,
                "write": true,
                "role": "value"
            },
            "native": {}
        }),
    )
    .await?;

    Ok(())
}

async fn read_host_flag(base: &PluginBase, parent: &Value) -> Option<bool> {
    if base.scope() != Scope::Adapter {
        return None;
    }
    let host = parent_host(parent)?;
    let Some(host_ns) = host_namespace(base.namespace(), base.parent_namespace(), host) else {
        base.logger().debug(&format!(
            "Namespace {} is not below {}, skipping host fallback",
            base.namespace(),
            base.parent_namespace()
        ));
        return None;
    };
    read_flag(base, &format!("{}.enabled", host_ns)).await
}

async fn read_flag(base: &PluginBase, id: &str) -> Option<bool> {
    match base.get_state(id).await {
        Ok(Some(state)) => parse_enabled(&state.val),
        Ok(None) => None,
        Err(e) => {
            base.logger()
                .debug(&format!("Could not read {}, treating as unset: {}", id, e));
            None
        }
    }
}

/// Host identifier exposed by the parent configuration.
pub fn parent_host(parent: &Value) -> Option<&str> {
    parent
        .get("common")
        .and_then(|common| common.get("host"))
        .and_then(Value::as_str)
        .filter(|host| !host.is_empty())
}

/// Derive the host-level namespace of a plugin.
///
/// Replaces the host instance prefix `<parent_namespace>.` of
/// `plugin_namespace` with `system.host.<host>.`. The prefix is matched
/// literally and must be followed by a dot, so `system.adapter.admin.0`
/// never matches `system.adapter.admin.01.…` or `system.adapter.admin2.0.…`.
/// Returns None when `plugin_namespace` is not below `parent_namespace`.
pub fn host_namespace(plugin_namespace: &str, parent_namespace: &str, host: &str) -> Option<String> {
    if parent_namespace.is_empty() {
        return None;
    }
    let pattern = Regex::new(&format!(r"^{}\.", regex::escape(parent_namespace))).ok()?;
    if !pattern.is_match(plugin_namespace) {
        return None;
    }
    let replacement = format!("system.host.{}.", host);
    Some(
        pattern
            .replace(plugin_namespace, NoExpand(&replacement))
            .into_owned(),
    )
}

/// Interpret a persisted value as an enabled flag.
///
/// Booleans and numbers (non-zero is true) map directly. Strings map by
/// truthiness: empty, `"0"` and `"false"` (any case, surrounding whitespace
/// ignored) are false, every other string is true. `null`, objects and
/// arrays count as unset.
pub fn parse_enabled(val: &Value) -> Option<bool> {
    match val {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            Some(!(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")))
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
