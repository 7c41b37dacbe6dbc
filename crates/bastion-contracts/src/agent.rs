//! Agent identity and registration types.
//!
//! BASTION does not prescribe what an agent is internally. It only needs a
//! stable identifier to hang capability grants, audit streams, and trust
//! scores on.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capability::CapabilitySet;

/// Stable, human-readable identifier for a registered agent.
///
/// Used across capability grants, audit records, alerts, and trust scores.
/// Example: AgentId("demo-agent")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The registry's view of one agent session.
///
/// The capability set is fixed for the lifetime of the registration. A new
/// set can only be installed by re-registering, which the registry accepts or
/// rejects according to its configured conflict mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRegistration {
    pub agent_id: AgentId,
    /// Everything the agent declared it may do.
    pub capabilities: CapabilitySet,
    /// Wall-clock time the registration took effect (UTC).
    pub registered_at: DateTime<Utc>,
}
