//! Plugin Module
//!
//! Provides the plugin lifecycle:
//! - Plugin interface and per-instance state
//! - Enabled-state resolution
//! - Module catalog
//! - Lifecycle handler

pub mod base;
pub mod catalog;
pub mod handler;
pub mod instance;
pub mod interface;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;

pub use base::PluginBase;
pub use catalog::PluginCatalog;
pub use handler::{InitReport, PluginHandler, PluginSlot};
pub use instance::{InitOutcome, PluginInstance};
pub use interface::{Plugin, PluginConfig, PluginFactory, PluginSettings};
pub use resolver::{EnabledSource, Resolution};
