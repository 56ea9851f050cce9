//! In-memory store.
//!
//! Implements both persistence services over hash maps. Used by tests and by
//! hosts that run without an external database. Reads and writes can be
//! made to fail on demand to exercise fault handling.

use crate::core::{Error, Result};
use crate::storage::backend::{merge_json, ObjectStore, StateStore, StateValue, StoredObject};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;

/// In-memory object and state store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Objects by id
    objects: RwLock<HashMap<String, StoredObject>>,
    /// States by id
    states: RwLock<HashMap<String, StateValue>>,
    /// Fail every read
    fail_reads: AtomicBool,
    /// Fail every write
    fail_writes: AtomicBool,
    /// Number of state writes performed
    state_writes: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent read fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful state writes.
    pub fn state_writes(&self) -> u64 {
        self.state_writes.load(Ordering::SeqCst)
    }

    /// Ids of all stored states, sorted.
    pub async fn state_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.states.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn check_read(&self, id: &str) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Storage(format!("read of {} rejected", id)));
        }
        Ok(())
    }

    fn check_write(&self, id: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Storage(format!("write of {} rejected", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get_object(&self, id: &str) -> Result<Option<StoredObject>> {
        self.check_read(id)?;
        let objects = self.objects.read().await;
        Ok(objects.get(id).cloned())
    }

    async fn set_object(&self, id: &str, obj: StoredObject) -> Result<()> {
        self.check_write(id)?;
        let mut objects = self.objects.write().await;
        objects.insert(id.to_string(), obj);
        Ok(())
    }

    async fn extend_object(&self, id: &str, partial: Value) -> Result<StoredObject> {
        self.check_write(id)?;
        let mut objects = self.objects.write().await;

        let merged = match objects.get(id) {
            Some(existing) => {
                let mut value = serde_json::to_value(existing)?;
                merge_json(&mut value, &partial);
                value
            }
            None => partial,
        };

        let obj: StoredObject = serde_json::from_value(merged)?;
        objects.insert(id.to_string(), obj.clone());
        Ok(obj)
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get_state(&self, id: &str) -> Result<Option<StateValue>> {
        self.check_read(id)?;
        let states = self.states.read().await;
        Ok(states.get(id).cloned())
    }

    async fn set_state(&self, id: &str, state: StateValue) -> Result<()> {
        self.check_write(id)?;
        let mut states = self.states.write().await;
        states.insert(id.to_string(), state);
        self.state_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::backend::ObjectKind;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_state_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get_state("a.enabled").await.unwrap().is_none());

        assert_ok!(store.set_state("a.enabled", StateValue::new(false, true, "a")).await);
        let state = store.get_state("a.enabled").await.unwrap().unwrap();
        assert_eq!(state.val, json!(false));
        assert_eq!(store.state_writes(), 1);
        assert_eq!(store.state_ids().await, vec!["a.enabled".to_string()]);
    }

    #[tokio::test]
    async fn test_extend_creates_then_merges() {
        let store = MemoryStore::new();
        let created = store
            .extend_object("a.enabled", json!({"type": "state", "common": {"name": "a"}}))
            .await
            .unwrap();
        assert_eq!(created.kind, ObjectKind::State);

        let merged = store
            .extend_object("a.enabled", json!({"common": {"role": "value"}}))
            .await
            .unwrap();
        assert_eq!(merged.common, json!({"name": "a", "role": "value"}));
    }

    #[tokio::test]
    async fn test_extend_without_type_fails() {
        let store = MemoryStore::new();
        let result = store.extend_object("a", json!({"common": {}})).await;
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[tokio::test]
    async fn test_fault_injection() {
        let store = MemoryStore::new();
        store.set_fail_reads(true);
        assert_err!(store.get_state("a").await);
        assert_err!(store.get_object("a").await);

        store.set_fail_reads(false);
        store.set_fail_writes(true);
        assert_err!(store.set_state("a", StateValue::new(true, true, "a")).await);
        assert_err!(store.set_object("a", StoredObject::new(ObjectKind::Folder)).await);
        assert_eq!(store.state_writes(), 0);
    }
}
