//! Plugin handler.
//!
//! Owns the slots of all registered plugins and drives them through
//! construction, database binding, initialization and teardown. A failing
//! plugin only ever takes down its own slot.

use crate::core::HostSettings;
use crate::plugin::base::PluginBase;
use crate::plugin::catalog::PluginCatalog;
use crate::plugin::instance::{InitOutcome, PluginInstance};
use crate::plugin::interface::{PluginConfig, PluginSettings};
use crate::storage::{ObjectStore, StateStore};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Registration entry of one plugin.
#[derive(Debug)]
pub struct PluginSlot {
    /// Plugin configuration
    pub config: PluginConfig,
    /// Live instance, if constructed and not destroyed
    pub instance: Option<PluginInstance>,
}

/// Outcomes of initializing every slot, in registration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InitReport {
    /// Plugin name and outcome
    pub outcomes: Vec<(String, InitOutcome)>,
}

impl InitReport {
    /// Names of plugins that were activated.
    pub fn activated(&self) -> Vec<&str> {
        self.filter(|o| *o == InitOutcome::Activated)
    }

    /// Names of plugins whose initialization failed.
    pub fn failed(&self) -> Vec<&str> {
        self.filter(InitOutcome::is_failure)
    }

    /// Outcome for `name`.
    pub fn outcome(&self, name: &str) -> Option<&InitOutcome> {
        self.outcomes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, outcome)| outcome)
    }

    fn filter(&self, pred: impl Fn(&InitOutcome) -> bool) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| pred(outcome))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Lifecycle orchestrator for a host's plugins.
pub struct PluginHandler {
    /// Host identity
    settings: HostSettings,
    /// Plugin constructors
    catalog: PluginCatalog,
    /// Slots by name
    slots: HashMap<String, PluginSlot>,
    /// Slot names in registration order
    order: Vec<String>,
}

impl PluginHandler {
    /// Create a handler for the host described by `settings`.
    pub fn new(settings: HostSettings, catalog: PluginCatalog) -> Self {
        Self {
            settings,
            catalog,
            slots: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Settings a plugin called `name` is constructed with.
    pub fn plugin_settings(&self, name: &str) -> PluginSettings {
        let log_namespace = format!("{} Plugin {}", self.settings.log_namespace, name);
        PluginSettings {
            name: name.to_string(),
            scope: self.settings.scope,
            namespace: format!("{}.plugins.{}", self.settings.namespace, name),
            parent_namespace: self.settings.namespace.clone(),
            logger: self.settings.logger.child(&log_namespace),
            log_namespace,
            host_config: self.settings.host_config.clone(),
            parent_package: self.settings.parent_package.clone(),
        }
    }

    /// Register a plugin and construct its instance.
    ///
    /// Returns whether a new instance was constructed. A name that already
    /// has a live instance is left untouched. Lookup and construction
    /// failures are logged and leave the slot without an instance.
    pub fn register(&mut self, name: &str, config: Value, resolve_hints: &[String]) -> bool {
        let logger = &self.settings.logger;

        if self.is_instantiated(name) {
            logger.warn(&format!("Plugin {} already registered, ignoring", name));
            return false;
        }

        let config = match PluginConfig::from_value(config) {
            Ok(config) => config,
            Err(e) => {
                logger.error(&format!("Plugin {} not registered: {}", name, e));
                return false;
            }
        };

        if !self.slots.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.slots.insert(
            name.to_string(),
            PluginSlot {
                config,
                instance: None,
            },
        );

        let (location, factory) = match self.catalog.resolve(name, resolve_hints) {
            Ok(found) => found,
            Err(e) => {
                logger.error(&format!("Plugin {} could not be resolved: {}", name, e));
                return false;
            }
        };

        let settings = self.plugin_settings(name);
        let constructed = std::panic::catch_unwind(AssertUnwindSafe(|| factory(&settings)));
        let plugin = match constructed {
            Ok(Ok(plugin)) => plugin,
            Ok(Err(e)) => {
                logger.error(&format!("Plugin {} could not be constructed: {}", name, e));
                return false;
            }
            Err(_) => {
                logger.error(&format!("Plugin {} panicked during construction", name));
                return false;
            }
        };

        let instance = PluginInstance::new(PluginBase::new(&settings), plugin);
        if let Some(slot) = self.slots.get_mut(name) {
            slot.instance = Some(instance);
        }
        logger.info(&format!("Plugin {} loaded from {}", name, location));
        true
    }

    /// Register every plugin of a name to config mapping, in map order.
    ///
    /// Returns the number of instances constructed.
    pub fn register_all(&mut self, plugins: &Map<String, Value>, resolve_hints: &[String]) -> usize {
        let mut constructed = 0;
        for (name, config) in plugins {
            if self.register(name, config.clone(), resolve_hints) {
                constructed += 1;
            }
        }
        constructed
    }

    /// Bind the persistence services to every live instance.
    pub fn bind_databases(&mut self, objects: Arc<dyn ObjectStore>, states: Arc<dyn StateStore>) {
        for name in &self.order {
            let Some(instance) = self.slots.get_mut(name).and_then(|s| s.instance.as_mut()) else {
                continue;
            };
            instance
                .base_mut()
                .set_database(Arc::clone(&objects), Arc::clone(&states));
        }
    }

    /// Initialize one plugin.
    ///
    /// A failing plugin is force-destroyed and evicted from its slot. A
    /// plugin that was already initialized reports its earlier outcome.
    pub async fn initialize_one(&mut self, name: &str, parent: &Value) -> InitOutcome {
        let Some(slot) = self.slots.get_mut(name) else {
            return InitOutcome::NotInstantiated;
        };
        let PluginSlot { config, instance } = slot;
        let Some(instance) = instance.as_mut() else {
            return InitOutcome::NotInstantiated;
        };
        if let Some(done) = instance.outcome() {
            return done.clone();
        }

        let outcome = match instance.initialize(config, parent).await {
            Ok(outcome) => outcome,
            Err(e) => InitOutcome::Failed(e.to_string()),
        };

        let logger = &self.settings.logger;
        match &outcome {
            InitOutcome::Activated => logger.info(&format!("Plugin {} initialized", name)),
            InitOutcome::NotActivated => {
                logger.info(&format!("Plugin {} loaded but not activated", name))
            }
            InitOutcome::Failed(reason) => {
                logger.error(&format!("Plugin {} failed to initialize: {}", name, reason));
                self.destroy_one(name, true).await;
            }
            InitOutcome::NotInstantiated => {}
        }
        outcome
    }

    /// Initialize every registered plugin in registration order.
    ///
    /// Never stops early; each slot's outcome is reported.
    pub async fn initialize_all(&mut self, parent: &Value) -> InitReport {
        let mut report = InitReport::default();
        for name in self.order.clone() {
            let outcome = self.initialize_one(&name, parent).await;
            report.outcomes.push((name, outcome));
        }
        report
    }

    /// Destroy one plugin.
    ///
    /// The instance is evicted when its destroy hook succeeds or `force` is
    /// set. An unforced destroy also persists the disabled state. Returns
    /// whether the instance was evicted.
    pub async fn destroy_one(&mut self, name: &str, force: bool) -> bool {
        let Some(slot) = self.slots.get_mut(name) else {
            return false;
        };
        let Some(instance) = slot.instance.as_mut() else {
            return false;
        };

        let logger = &self.settings.logger;
        let destroyed = instance.destroy().await;
        if !destroyed && !force {
            logger.warn(&format!("Plugin {} could not be destroyed", name));
            return false;
        }

        if !force {
            if let Err(e) = instance.base_mut().set_active(false).await {
                logger.warn(&format!("Plugin {} could not persist disabled state: {}", name, e));
            }
        }
        instance.base_mut().mark_destroyed();
        slot.instance = None;
        logger.info(&format!("Plugin {} destroyed", name));
        true
    }

    /// Force-destroy every plugin.
    pub async fn destroy_all(&mut self) {
        for name in self.order.clone() {
            self.destroy_one(&name, true).await;
        }
    }

    /// Live instance of `name`.
    pub fn instance(&self, name: &str) -> Option<&PluginInstance> {
        self.slots.get(name).and_then(|s| s.instance.as_ref())
    }

    /// Mutable live instance of `name`.
    pub fn instance_mut(&mut self, name: &str) -> Option<&mut PluginInstance> {
        self.slots.get_mut(name).and_then(|s| s.instance.as_mut())
    }

    /// Configuration of `name`.
    pub fn config(&self, name: &str) -> Option<&PluginConfig> {
        self.slots.get(name).map(|s| &s.config)
    }

    /// Whether `name` was registered.
    pub fn exists(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Whether `name` has a live instance.
    pub fn is_instantiated(&self, name: &str) -> bool {
        self.instance(name).is_some()
    }

    /// Whether `name` has a live, active instance.
    pub fn is_active(&self, name: &str) -> bool {
        self.instance(name).map_or(false, PluginInstance::is_active)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of registered slots.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Host settings.
    pub fn settings(&self) -> &HostSettings {
        &self.settings
    }
}
