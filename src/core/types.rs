//! Common types used across plugin host modules.

use serde::{Deserialize, Serialize};

/// Hosting context of a plugin.
///
/// Adapter-hosted plugins additionally fall back to a host-level enabled flag
/// when they have no flag of their own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Hosted by an adapter instance
    Adapter,
    /// Hosted by the controller process
    Controller,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Adapter => write!(f, "adapter"),
            Scope::Controller => write!(f, "controller"),
        }
    }
}

/// Lifecycle state of a plugin instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Constructed, no persistence bound
    Unbound,
    /// Persistence handles injected
    Bound,
    /// Enabled-flag lookup or init hook in progress
    Initializing,
    /// Init hook succeeded
    Active,
    /// Not activated, or init hook failed
    Inactive,
    /// Torn down; terminal
    Destroyed,
}

impl LifecycleState {
    /// Whether persistence accessors may be used in this state.
    pub fn is_bound(&self) -> bool {
        !matches!(self, LifecycleState::Unbound | LifecycleState::Destroyed)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LifecycleState::Unbound => "unbound",
            LifecycleState::Bound => "bound",
            LifecycleState::Initializing => "initializing",
            LifecycleState::Active => "active",
            LifecycleState::Inactive => "inactive",
            LifecycleState::Destroyed => "destroyed",
        };
        write!(f, "{}", s)
    }
}

/// Timestamp wrapper for consistent serialization.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Get current UTC timestamp.
pub fn now() -> Timestamp {
    chrono::Utc::now()
}
