//! Plugin module catalog.
//!
//! Maps plugin names to constructors, grouped by location. Hosts populate
//! the catalog at startup; registration then looks plugins up by name in the
//! locations given as resolve hints.

use crate::core::{Error, Result};
use crate::plugin::interface::{Plugin, PluginFactory, PluginSettings};
use std::collections::HashMap;
use std::sync::Arc;

/// Prefix of plugin module ids.
pub const MODULE_PREFIX: &str = "plugin-";

/// Module id of a plugin name, e.g. `plugin-sentry`.
pub fn module_id(name: &str) -> String {
    format!("{}{}", MODULE_PREFIX, name)
}

/// A named group of plugin modules.
struct CatalogLocation {
    name: String,
    modules: HashMap<String, PluginFactory>,
}

/// Catalog of plugin constructors.
#[derive(Default)]
pub struct PluginCatalog {
    /// Locations in the order they were first provided
    locations: Vec<CatalogLocation>,
}

impl PluginCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the plugin `name` constructible from `location`.
    ///
    /// Providing the same name twice in one location replaces the factory.
    pub fn provide<F>(&mut self, location: &str, name: &str, factory: F)
    where
        F: Fn(&PluginSettings) -> Result<Box<dyn Plugin>> + Send + Sync + 'static,
    {
        let index = match self.locations.iter().position(|l| l.name == location) {
            Some(index) => index,
            None => {
                self.locations.push(CatalogLocation {
                    name: location.to_string(),
                    modules: HashMap::new(),
                });
                self.locations.len() - 1
            }
        };
        self.locations[index]
            .modules
            .insert(module_id(name), Arc::new(factory));
    }

    /// Builder form of [`PluginCatalog::provide`].
    pub fn with_plugin<F>(mut self, location: &str, name: &str, factory: F) -> Self
    where
        F: Fn(&PluginSettings) -> Result<Box<dyn Plugin>> + Send + Sync + 'static,
    {
        self.provide(location, name, factory);
        self
    }

    /// Find the constructor of `name`.
    ///
    /// Searches the locations named in `hints` in order; with no hints every
    /// location is searched in the order it was provided. Returns the
    /// location that matched together with the factory.
    pub fn resolve(&self, name: &str, hints: &[String]) -> Result<(String, PluginFactory)> {
        let id = module_id(name);
        let candidates: Vec<&CatalogLocation> = if hints.is_empty() {
            self.locations.iter().collect()
        } else {
            hints
                .iter()
                .filter_map(|hint| self.locations.iter().find(|l| &l.name == hint))
                .collect()
        };

        for location in &candidates {
            if let Some(factory) = location.modules.get(&id) {
                return Ok((location.name.clone(), Arc::clone(factory)));
            }
        }

        let searched = if hints.is_empty() {
            self.location_names().join(", ")
        } else {
            hints.join(", ")
        };
        Err(Error::PluginNotFound(format!("{} (searched: {})", id, searched)))
    }

    /// Whether any location provides `name`.
    pub fn contains(&self, name: &str) -> bool {
        let id = module_id(name);
        self.locations.iter().any(|l| l.modules.contains_key(&id))
    }

    /// Names of all locations.
    pub fn location_names(&self) -> Vec<&str> {
        self.locations.iter().map(|l| l.name.as_str()).collect()
    }
}

impl std::fmt::Debug for PluginCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for location in &self.locations {
            let mut modules: Vec<&String> = location.modules.keys().collect();
            modules.sort();
            map.entry(&location.name, &modules);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::testing::{adapter_settings, BarePlugin};

    fn bare(_settings: &PluginSettings) -> Result<Box<dyn Plugin>> {
        Ok(Box::new(BarePlugin))
    }

    fn broken(settings: &PluginSettings) -> Result<Box<dyn Plugin>> {
        Err(Error::Construction(settings.name.clone()))
    }

    #[test]
    fn test_module_id() {
        assert_eq!(module_id("sentry"), "plugin-sentry");
    }

    #[test]
    fn test_resolve_without_hints() {
        let catalog = PluginCatalog::new()
            .with_plugin("builtin", "sentry", bare)
            .with_plugin("vendor", "auth", bare);

        let (location, _) = catalog.resolve("auth", &[]).unwrap();
        assert_eq!(location, "vendor");
        assert!(catalog.contains("sentry"));
        assert!(!catalog.contains("metrics"));
    }

    #[test]
    fn test_resolve_respects_hint_order() {
        let catalog = PluginCatalog::new()
            .with_plugin("builtin", "sentry", bare)
            .with_plugin("vendor", "sentry", broken);

        let hints = vec!["vendor".to_string(), "builtin".to_string()];
        let (location, factory) = catalog.resolve("sentry", &hints).unwrap();
        assert_eq!(location, "vendor");
        assert!(factory(&adapter_settings("sentry")).is_err());

        let hints = vec!["builtin".to_string()];
        let (location, factory) = catalog.resolve("sentry", &hints).unwrap();
        assert_eq!(location, "builtin");
        assert!(factory(&adapter_settings("sentry")).is_ok());
    }

    #[test]
    fn test_resolve_not_found() {
        let catalog = PluginCatalog::new().with_plugin("builtin", "sentry", bare);

        let hints = vec!["vendor".to_string()];
        match catalog.resolve("sentry", &hints) {
            Err(Error::PluginNotFound(msg)) => {
                assert_eq!(msg, "plugin-sentry (searched: vendor)")
            }
            _ => panic!("expected PluginNotFound"),
        }
        assert!(matches!(
            catalog.resolve("metrics", &[]),
            Err(Error::PluginNotFound(_))
        ));
    }

    #[test]
    fn test_provide_replaces() {
        let mut catalog = PluginCatalog::new();
        catalog.provide("builtin", "sentry", broken);
        catalog.provide("builtin", "sentry", bare);

        let (_, factory) = catalog.resolve("sentry", &[]).unwrap();
        assert!(factory(&adapter_settings("sentry")).is_ok());
        assert_eq!(catalog.location_names(), vec!["builtin"]);
        assert_eq!(format!("{:?}", catalog), r#"{"builtin": ["plugin-sentry"]}"#);
    }
}
