//! Trust score snapshot and history types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::AgentId;

/// Lowest possible trust score.
pub const TRUST_MIN: f64 = 0.0;

/// Highest possible trust score.
pub const TRUST_MAX: f64 = 100.0;

/// Point-in-time view of one agent's trust state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustSnapshot {
    pub agent_id: AgentId,
    /// Always within `[TRUST_MIN, TRUST_MAX]`.
    pub score: f64,
    /// Number of capability violations recorded against the agent.
    pub violation_count: u64,
    /// Number of successful actions credited to the agent.
    pub success_count: u64,
    /// Last time a penalty or reward was applied.
    pub last_active: Option<DateTime<Utc>>,
}

/// One entry in an agent's trust history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustScoreChange {
    pub agent_id: AgentId,
    pub previous: f64,
    pub current: f64,
    /// Short description, e.g. `"penalty:high"` or `"reward:medium"`.
    pub reason: String,
    pub recorded_at: DateTime<Utc>,
}
