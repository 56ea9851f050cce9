//! A constructed plugin: its base state plus its hooks.

use crate::core::{Error, LifecycleState, Result};
use crate::plugin::base::PluginBase;
use crate::plugin::interface::{Plugin, PluginConfig};
use crate::plugin::resolver::resolve_enabled;
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;

/// Result of initializing one plugin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitOutcome {
    /// Init hook succeeded; the plugin is running
    Activated,
    /// Resolved as disabled; the init hook was not called
    NotActivated,
    /// Init hook failed or panicked, or the enabled state could not be set up
    Failed(String),
    /// No live instance to initialize
    NotInstantiated,
}

impl InitOutcome {
    /// Whether this outcome is a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, InitOutcome::Failed(_))
    }
}

/// A live plugin owned by a handler slot.
pub struct PluginInstance {
    base: PluginBase,
    plugin: Box<dyn Plugin>,
    outcome: Option<InitOutcome>,
}

impl PluginInstance {
    pub fn new(base: PluginBase, plugin: Box<dyn Plugin>) -> Self {
        Self {
            base,
            plugin,
            outcome: None,
        }
    }

    pub fn base(&self) -> &PluginBase {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut PluginBase {
        &mut self.base
    }

    pub fn is_active(&self) -> bool {
        self.base.is_active()
    }

    /// Outcome of the one initialization this instance went through.
    pub fn outcome(&self) -> Option<&InitOutcome> {
        self.outcome.as_ref()
    }

    /// Resolve the enabled state and, when enabled, run the init hook.
    ///
    /// Initialization starts only from `Bound`. Once it has run, later calls
    /// return the recorded outcome without resolving or calling the hook
    /// again. The hook receives a copy of `config` with the resolved
    /// `enabled` field injected; `config` itself is left untouched.
    ///
    /// The returned error covers an unbound or destroyed instance and
    /// failures to persist the active state after a successful hook.
    pub async fn initialize(&mut self, config: &PluginConfig, parent: &Value) -> Result<InitOutcome> {
        match self.base.lifecycle() {
            LifecycleState::Unbound => {
                return Err(Error::NotInitialized(self.base.namespace().to_string()))
            }
            LifecycleState::Destroyed => {
                return Err(Error::Destroyed(self.base.namespace().to_string()))
            }
            LifecycleState::Bound => {}
            LifecycleState::Initializing | LifecycleState::Active | LifecycleState::Inactive => {
                if let Some(outcome) = &self.outcome {
                    self.base.logger().debug("Plugin already initialized");
                    return Ok(outcome.clone());
                }
            }
        }

        let result = self.run_init(config, parent).await;
        self.outcome = Some(match &result {
            Ok(outcome) => outcome.clone(),
            Err(e) => InitOutcome::Failed(e.to_string()),
        });
        result
    }

    async fn run_init(&mut self, config: &PluginConfig, parent: &Value) -> Result<InitOutcome> {
        self.base.set_lifecycle(LifecycleState::Initializing);
        let resolution = match resolve_enabled(&self.base, config, parent).await {
            Ok(resolution) => resolution,
            Err(e) => {
                self.base.mark_inactive();
                return Err(e);
            }
        };

        if !resolution.activate {
            self.base.logger().debug("Do not initialize plugin (enabled=false)");
            self.base.mark_inactive();
            return Ok(InitOutcome::NotActivated);
        }

        let mut effective = config.clone();
        effective.set_enabled(true);

        self.base.logger().debug("Initialize plugin (enabled=true)");
        let hook = AssertUnwindSafe(self.plugin.init(&self.base, &effective))
            .catch_unwind()
            .await;
        let failure = match hook {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(panic) => Some(Error::PluginPanicked(panic_message(panic.as_ref())).to_string()),
        };

        match failure {
            None => {
                if let Err(e) = self.base.set_active(true).await {
                    self.base.set_lifecycle(LifecycleState::Inactive);
                    return Err(e);
                }
                self.base.set_lifecycle(LifecycleState::Active);
                Ok(InitOutcome::Activated)
            }
            Some(reason) => {
                if let Err(e) = self.base.set_active(false).await {
                    self.base
                        .logger()
                        .warn(&format!("Could not persist disabled state: {}", e));
                }
                self.base.set_lifecycle(LifecycleState::Inactive);
                Ok(InitOutcome::Failed(reason))
            }
        }
    }

    /// Run the destroy hook. A panicking hook counts as failed teardown.
    pub async fn destroy(&mut self) -> bool {
        match AssertUnwindSafe(self.plugin.destroy(&self.base))
            .catch_unwind()
            .await
        {
            Ok(done) => done,
            Err(panic) => {
                self.base.logger().error(&format!(
                    "Destroy hook panicked: {}",
                    panic_message(panic.as_ref())
                ));
                false
            }
        }
    }
}

impl std::fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginInstance")
            .field("base", &self.base)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
