//! # plughost - Plugin Lifecycle Host
//!
//! An embeddable host for named plugins providing:
//! - **Catalog**: explicit name to constructor registry
//! - **Handler**: registration, database binding, initialization and teardown
//! - **Resolver**: persisted enabled flags with host-level and config fallback
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use plughost::core::{HostConfig, Result};
//! use plughost::monitoring::Logger;
//! use plughost::plugin::{Plugin, PluginBase, PluginCatalog, PluginConfig, PluginHandler};
//! use plughost::storage::MemoryStore;
//! use std::sync::Arc;
//!
//! struct Sentry;
//!
//! #[async_trait]
//! impl Plugin for Sentry {
//!     async fn init(&mut self, base: &PluginBase, _config: &PluginConfig) -> Result<()> {
//!         base.logger().info("Sentry started");
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = HostConfig::adapter("admin", 0)
//!         .with_plugin("sentry", serde_json::json!({}))
//!         .with_resolve_hint("builtin");
//!     let catalog = PluginCatalog::new()
//!         .with_plugin("builtin", "sentry", |_| Ok(Box::new(Sentry) as Box<dyn Plugin>));
//!
//!     let mut handler = PluginHandler::new(config.settings(Logger::default_logger("admin.0")), catalog);
//!     handler.register_all(&config.plugins, &config.resolve_hints);
//!
//!     let store = Arc::new(MemoryStore::new());
//!     handler.bind_databases(store.clone(), store);
//!     let report = handler.initialize_all(&config.parent_package).await;
//!     println!("active: {:?}", report.activated());
//!
//!     handler.destroy_all().await;
//! }
//! ```

pub mod core;
pub mod monitoring;
pub mod plugin;
pub mod storage;

pub use crate::core::error::{Error, Result};
