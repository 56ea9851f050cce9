//! Test plugins and fixtures shared by the plugin module tests.

use crate::core::{Error, HostConfig, HostSettings, Result, Scope};
use crate::monitoring::{Logger, LoggerConfig, LogLevel};
use crate::plugin::base::PluginBase;
use crate::plugin::catalog::PluginCatalog;
use crate::plugin::interface::{Plugin, PluginConfig, PluginSettings};
use crate::storage::{MemoryStore, StateValue};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// What a [`TestPlugin`] does when initialized.
#[derive(Clone, Copy, Debug)]
pub enum InitBehavior {
    Succeed,
    Fail,
    Panic,
}

/// Hook call counters.
#[derive(Debug, Default)]
pub struct Calls {
    pub constructed: AtomicUsize,
    pub inits: AtomicUsize,
    pub destroys: AtomicUsize,
}

impl Calls {
    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }

    pub fn inits(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    pub fn destroys(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }
}

/// Configurable plugin recording its hook calls.
pub struct TestPlugin {
    init: InitBehavior,
    destroy_ok: bool,
    calls: Arc<Calls>,
}

impl TestPlugin {
    pub fn new(init: InitBehavior, destroy_ok: bool, calls: Arc<Calls>) -> Self {
        Self {
            init,
            destroy_ok,
            calls,
        }
    }
}

#[async_trait]
impl Plugin for TestPlugin {
    async fn init(&mut self, base: &PluginBase, config: &PluginConfig) -> Result<()> {
        self.calls.inits.fetch_add(1, Ordering::SeqCst);
        match self.init {
            InitBehavior::Succeed => {
                let marker = format!("{}.info.started", base.namespace());
                base.set_state(&marker, StateValue::new(config.clone().into_value(), true, base.namespace()))
                    .await
            }
            InitBehavior::Fail => Err(Error::InitFailed("refused to start".to_string())),
            InitBehavior::Panic => panic!("plugin exploded"),
        }
    }

    async fn destroy(&mut self, _base: &PluginBase) -> bool {
        self.calls.destroys.fetch_add(1, Ordering::SeqCst);
        self.destroy_ok
    }
}

/// Plugin relying on the default hooks.
pub struct BarePlugin;

#[async_trait]
impl Plugin for BarePlugin {}

/// Catalog location used by the fixtures.
pub const BUILTIN: &str = "builtin";

/// Register a [`TestPlugin`] under `name` and return its counters.
pub fn provide_test_plugin(
    catalog: &mut PluginCatalog,
    name: &str,
    init: InitBehavior,
    destroy_ok: bool,
) -> Arc<Calls> {
    let calls = Arc::new(Calls::default());
    let shared = Arc::clone(&calls);
    catalog.provide(BUILTIN, name, move |_settings: &PluginSettings| {
        shared.constructed.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TestPlugin::new(init, destroy_ok, Arc::clone(&shared))) as Box<dyn Plugin>)
    });
    calls
}

pub fn test_logger() -> Logger {
    Logger::new(
        "admin.0",
        LoggerConfig {
            level: LogLevel::Trace,
            ..Default::default()
        },
    )
}

pub fn adapter_host() -> HostSettings {
    HostConfig::adapter("admin", 0).settings(test_logger())
}

pub fn adapter_settings(name: &str) -> PluginSettings {
    let logger = test_logger();
    PluginSettings {
        name: name.to_string(),
        scope: Scope::Adapter,
        namespace: format!("system.adapter.admin.0.plugins.{}", name),
        parent_namespace: "system.adapter.admin.0".to_string(),
        log_namespace: format!("admin.0 Plugin {}", name),
        logger: logger.child(&format!("admin.0 Plugin {}", name)),
        host_config: serde_json::json!({}),
        parent_package: serde_json::json!({"common": {"name": "admin", "host": "pi4"}}),
    }
}

pub fn controller_settings(name: &str) -> PluginSettings {
    PluginSettings {
        scope: Scope::Controller,
        namespace: format!("system.host.pi4.plugins.{}", name),
        parent_namespace: "system.host.pi4".to_string(),
        ..adapter_settings(name)
    }
}

/// A base bound to a fresh in-memory store.
pub fn bound_base(settings: PluginSettings) -> (PluginBase, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let mut base = PluginBase::new(&settings);
    base.set_database(store.clone(), store.clone());
    (base, store)
}

/// Parent configuration exposing `host`.
pub fn parent_with_host(host: &str) -> serde_json::Value {
    serde_json::json!({"common": {"name": "admin", "host": host}})
}
