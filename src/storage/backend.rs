//! Persistence service traits.
//!
//! The host consumes two services: an object store holding definitions
//! (folders, state objects) and a state store holding current values. Both
//! are shared between all plugins of a host.

use crate::core::{now, Result, Timestamp};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of a stored object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Grouping node
    Folder,
    /// Definition of a state
    State,
    /// Channel node
    Channel,
    /// Device node
    Device,
    /// Metadata node
    Meta,
}

/// An object definition in the object store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Object kind
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    /// Common attributes (name, role, value type...)
    #[serde(default)]
    pub common: Value,
    /// Implementation specific attributes
    #[serde(default)]
    pub native: Value,
}

impl StoredObject {
    /// Create an object with empty attributes.
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            common: Value::Object(Default::default()),
            native: Value::Object(Default::default()),
        }
    }

    /// Set common attributes.
    pub fn with_common(mut self, common: Value) -> Self {
        self.common = common;
        self
    }
}

/// A state value in the state store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateValue {
    /// Current value
    pub val: Value,
    /// Whether the value was confirmed by its owner
    pub ack: bool,
    /// Namespace of the writer
    pub from: String,
    /// Write time
    pub ts: Timestamp,
}

impl StateValue {
    /// Create a state value stamped with the current time.
    pub fn new(val: impl Into<Value>, ack: bool, from: &str) -> Self {
        Self {
            val: val.into(),
            ack,
            from: from.to_string(),
            ts: now(),
        }
    }
}

/// Object store service.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read an object by id.
    ///
    /// Returns None if the object doesn't exist.
    async fn get_object(&self, id: &str) -> Result<Option<StoredObject>>;

    /// Write an object, replacing any existing one.
    async fn set_object(&self, id: &str, obj: StoredObject) -> Result<()>;

    /// Merge a partial object into an existing one, or create it.
    ///
    /// Returns the resulting object.
    async fn extend_object(&self, id: &str, partial: Value) -> Result<StoredObject>;
}

/// State store service.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read a state by id.
    ///
    /// Returns None if the state was never written.
    async fn get_state(&self, id: &str) -> Result<Option<StateValue>>;

    /// Write a state.
    async fn set_state(&self, id: &str, state: StateValue) -> Result<()>;
}

/// Deep-merge `patch` into `target`.
///
/// Objects are merged key by key; any other value in `patch` replaces the
/// value in `target`.
pub fn merge_json(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}
