//! Per-instance plugin state.
//!
//! [`PluginBase`] carries a plugin's identity, its persistence handles and
//! its lifecycle state. Persistence accessors refuse to run until
//! [`PluginBase::set_database`] has been called.

use crate::core::{Error, LifecycleState, Result, Scope};
use crate::monitoring::Logger;
use crate::plugin::interface::PluginSettings;
use crate::storage::{ObjectStore, StateStore, StateValue, StoredObject};
use serde_json::Value;
use std::sync::Arc;

/// Identity, persistence handles and lifecycle state of a plugin.
pub struct PluginBase {
    /// Registered plugin name
    name: String,
    /// Hosting context
    scope: Scope,
    /// Plugin namespace
    namespace: String,
    /// Host namespace
    parent_namespace: String,
    /// Prefixed logger
    logger: Logger,
    /// Host configuration snapshot
    host_config: Value,
    /// Host package metadata snapshot
    parent_package: Value,
    /// Object store, once bound
    objects_db: Option<Arc<dyn ObjectStore>>,
    /// State store, once bound
    states_db: Option<Arc<dyn StateStore>>,
    /// Mirror of the persisted enabled flag
    is_active: bool,
    /// Lifecycle state
    state: LifecycleState,
}

impl PluginBase {
    /// Create an unbound, inactive base from the plugin's settings.
    pub fn new(settings: &PluginSettings) -> Self {
        Self {
            name: settings.name.clone(),
            scope: settings.scope,
            namespace: settings.namespace.clone(),
            parent_namespace: settings.parent_namespace.clone(),
            logger: settings.logger.clone(),
            host_config: settings.host_config.clone(),
            parent_package: settings.parent_package.clone(),
            objects_db: None,
            states_db: None,
            is_active: false,
            state: LifecycleState::Unbound,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn parent_namespace(&self) -> &str {
        &self.parent_namespace
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn host_config(&self) -> &Value {
        &self.host_config
    }

    pub fn parent_package(&self) -> &Value {
        &self.parent_package
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.state
    }

    /// Id of the persisted enabled flag.
    pub fn enabled_id(&self) -> String {
        format!("{}.enabled", self.namespace)
    }

    /// Inject the persistence services.
    pub fn set_database(&mut self, objects: Arc<dyn ObjectStore>, states: Arc<dyn StateStore>) {
        if self.state == LifecycleState::Destroyed {
            self.logger.warn("Ignoring database binding for destroyed plugin");
            return;
        }
        self.objects_db = Some(objects);
        self.states_db = Some(states);
        if self.state == LifecycleState::Unbound {
            self.state = LifecycleState::Bound;
        }
    }

    fn objects(&self) -> Result<&Arc<dyn ObjectStore>> {
        self.objects_db
            .as_ref()
            .ok_or_else(|| Error::NotInitialized(format!("{}: objects database", self.namespace)))
    }

    fn states(&self) -> Result<&Arc<dyn StateStore>> {
        self.states_db
            .as_ref()
            .ok_or_else(|| Error::NotInitialized(format!("{}: states database", self.namespace)))
    }

    pub async fn get_state(&self, id: &str) -> Result<Option<StateValue>> {
        self.states()?.get_state(id).await
    }

    pub async fn set_state(&self, id: &str, state: StateValue) -> Result<()> {
        self.states()?.set_state(id, state).await
    }

    pub async fn get_object(&self, id: &str) -> Result<Option<StoredObject>> {
        self.objects()?.get_object(id).await
    }

    pub async fn set_object(&self, id: &str, obj: StoredObject) -> Result<()> {
        self.objects()?.set_object(id, obj).await
    }

    pub async fn extend_object(&self, id: &str, partial: Value) -> Result<StoredObject> {
        self.objects()?.extend_object(id, partial).await
    }

    /// Record the active state and persist it as the enabled flag.
    ///
    /// The in-memory flag only stays `true` when the write succeeded.
    pub async fn set_active(&mut self, active: bool) -> Result<()> {
        let state = StateValue::new(active, true, &self.namespace);
        let result = self.set_state(&self.enabled_id(), state).await;
        self.is_active = active && result.is_ok();
        result
    }

    pub(crate) fn set_lifecycle(&mut self, state: LifecycleState) {
        self.state = state;
    }

    /// Mark inactive without touching the persisted flag.
    pub(crate) fn mark_inactive(&mut self) {
        self.is_active = false;
        self.state = LifecycleState::Inactive;
    }

    pub(crate) fn mark_destroyed(&mut self) {
        self.is_active = false;
        self.state = LifecycleState::Destroyed;
    }
}

impl std::fmt::Debug for PluginBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginBase")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("namespace", &self.namespace)
            .field("bound", &self.objects_db.is_some())
            .field("is_active", &self.is_active)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::testing::{adapter_settings, bound_base};
    use crate::storage::{MemoryStore, ObjectKind};
    use serde_json::json;
    use tokio_test::assert_ok;

    #[test]
    fn test_new_base_is_unbound() {
        let base = PluginBase::new(&adapter_settings("sentry"));
        assert_eq!(base.lifecycle(), LifecycleState::Unbound);
        assert!(!base.is_active());
        assert_eq!(base.namespace(), "system.adapter.admin.0.plugins.sentry");
        assert_eq!(base.enabled_id(), "system.adapter.admin.0.plugins.sentry.enabled");
    }

    #[tokio::test]
    async fn test_accessors_before_bind_fail() {
        let base = PluginBase::new(&adapter_settings("sentry"));

        assert!(matches!(base.get_state("x").await, Err(Error::NotInitialized(_))));
        assert!(matches!(
            base.set_state("x", StateValue::new(1, false, "t")).await,
            Err(Error::NotInitialized(_))
        ));
        assert!(matches!(base.get_object("x").await, Err(Error::NotInitialized(_))));
        assert!(matches!(
            base.set_object("x", StoredObject::new(ObjectKind::Folder)).await,
            Err(Error::NotInitialized(_))
        ));
        assert!(matches!(
            base.extend_object("x", json!({"type": "folder"})).await,
            Err(Error::NotInitialized(_))
        ));
    }

    #[tokio::test]
    async fn test_set_active_before_bind_fails() {
        let mut base = PluginBase::new(&adapter_settings("sentry"));
        assert!(matches!(base.set_active(true).await, Err(Error::NotInitialized(_))));
        assert!(!base.is_active());
    }

    #[tokio::test]
    async fn test_bind_then_access() {
        let (base, store) = bound_base(adapter_settings("sentry"));
        assert_eq!(base.lifecycle(), LifecycleState::Bound);

        assert_ok!(base.set_state("x", StateValue::new(5, false, "test")).await);
        let state = base.get_state("x").await.unwrap().unwrap();
        assert_eq!(state.val, json!(5));
        assert_eq!(store.state_writes(), 1);
    }

    #[tokio::test]
    async fn test_set_active_persists_flag() {
        let (mut base, store) = bound_base(adapter_settings("sentry"));

        base.set_active(true).await.unwrap();
        assert!(base.is_active());
        let flag = store.get_state(&base.enabled_id()).await.unwrap().unwrap();
        assert_eq!(flag.val, json!(true));
        assert!(flag.ack);
        assert_eq!(flag.from, base.namespace());

        base.set_active(false).await.unwrap();
        assert!(!base.is_active());
        let flag = store.get_state(&base.enabled_id()).await.unwrap().unwrap();
        assert_eq!(flag.val, json!(false));
    }

    #[tokio::test]
    async fn test_set_active_write_failure_leaves_inactive() {
        let (mut base, store) = bound_base(adapter_settings("sentry"));
        store.set_fail_writes(true);

        assert!(base.set_active(true).await.is_err());
        assert!(!base.is_active());
    }

    #[test]
    fn test_bind_after_destroy_ignored() {
        let mut base = PluginBase::new(&adapter_settings("sentry"));
        base.mark_destroyed();

        let store = Arc::new(MemoryStore::new());
        base.set_database(store.clone(), store);
        assert_eq!(base.lifecycle(), LifecycleState::Destroyed);
    }
}
