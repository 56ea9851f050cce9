//! Storage Module
//!
//! Persistence services consumed by plugins:
//! - Object and state store traits
//! - In-memory store

pub mod backend;
pub mod memory;

pub use backend::{ObjectKind, ObjectStore, StateStore, StateValue, StoredObject};
pub use memory::MemoryStore;
