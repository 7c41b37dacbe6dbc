//! Core trait definitions for the BASTION enforcement pipeline.
//!
//! These four traits define the trust boundary around an agent's actions:
//!
//! - `CapabilityRegistry` — trusted lookup (what each agent declared it may do)
//! - `RiskClassifier`     — trusted, pure mapping from action to risk tier
//! - `AuditLogger`        — trusted sink (records every decision immutably)
//! - `TrustLedger`        — per-agent trust signal (observability, not a gate)
//!
//! The interceptor wires them together in the correct order. The wrapped
//! business action is never invoked unless the registry authorizes it.

use bastion_contracts::{
    agent::{AgentId, AgentRegistration},
    audit::{AuditFilter, AuditRecord, AuditRecordId, ExecutionOutcome, RecordKind, SecurityAlert},
    capability::CapabilitySet,
    decision::{AuthorizationDecision, RiskTier},
    error::BastionResult,
    trust::TrustSnapshot,
};

/// Holds every registered agent's declared capability set.
///
/// Read-mostly: registration happens once per agent session and every request
/// afterwards is a lookup.
pub trait CapabilityRegistry: Send + Sync {
    /// Register `agent_id` with `capabilities`.
    ///
    /// Whether an existing registration is replaced or rejected with
    /// `AlreadyRegistered` is up to the implementation and must be documented
    /// by it. Concurrent registrations of the same id must not both succeed
    /// when replacement is rejected.
    fn register(
        &self,
        agent_id: AgentId,
        capabilities: CapabilitySet,
    ) -> BastionResult<AgentRegistration>;

    /// Remove an agent. Later lookups fail with `UnknownAgent`.
    fn deregister(&self, agent_id: &AgentId) -> BastionResult<AgentRegistration>;

    /// Return the current registration for `agent_id`.
    fn registration(&self, agent_id: &AgentId) -> BastionResult<AgentRegistration>;

    /// Return true if some capability of `agent_id` covers `action_type` on
    /// `resource`.
    ///
    /// Pure: no side effects. Absence of a matching grant is `Ok(false)`;
    /// an unregistered agent is `Err(UnknownAgent)`.
    fn authorize(&self, agent_id: &AgentId, action_type: &str, resource: &str)
        -> BastionResult<bool>;
}

/// Maps a declared risk level to the tier the runtime acts on.
///
/// Implementations must be deterministic and total, and must never lower the
/// declared level.
pub trait RiskClassifier: Send + Sync {
    fn classify(&self, action_type: &str, declared: RiskTier) -> RiskTier;
}

/// The append-only audit trail.
///
/// Every decision produces exactly one record. Records are never deleted and
/// their decision fields are never modified; only the outcome may be attached,
/// once.
pub trait AuditLogger: Send + Sync {
    /// Append a record for `decision`.
    ///
    /// For a denied decision the implementation raises exactly one
    /// `SecurityAlert` referencing the new record as part of the same write.
    /// A transient failure (`AuditWriteFailed { transient: true }`) means
    /// nothing was written and the call may be retried.
    fn record(&self, decision: &AuthorizationDecision, kind: RecordKind)
        -> BastionResult<AuditRecordId>;

    /// Attach the post-execution outcome to a record. Succeeds at most once
    /// per record.
    fn update_outcome(&self, id: AuditRecordId, outcome: ExecutionOutcome) -> BastionResult<()>;

    /// Iterate the records matching `filter`.
    ///
    /// The iterator is lazy and finite; calling `query` again restarts it.
    fn query(&self, filter: &AuditFilter) -> Box<dyn Iterator<Item = AuditRecord> + Send + '_>;

    /// Iterate the security alerts matching `filter`.
    fn alerts(&self, filter: &AuditFilter) -> Box<dyn Iterator<Item = SecurityAlert> + Send + '_>;
}

/// Per-agent trust scores.
///
/// Every update is a single atomic read-modify-write per agent; concurrent
/// penalties and rewards for the same agent must never be lost. Scores stay
/// within `[0, 100]`.
pub trait TrustLedger: Send + Sync {
    /// Start tracking `agent_id`. Idempotent: an agent that is already
    /// enrolled keeps its score. Returns the current score.
    fn enroll(&self, agent_id: &AgentId) -> BastionResult<f64>;

    /// Stop tracking `agent_id`, returning its final state if it was enrolled.
    fn retire(&self, agent_id: &AgentId) -> Option<TrustSnapshot>;

    /// Apply the penalty for a violation at `tier`. Returns the new score,
    /// or `UnknownAgent` if `agent_id` is not enrolled.
    fn penalize(&self, agent_id: &AgentId, tier: RiskTier) -> BastionResult<f64>;

    /// Apply the reward for a successful action at `tier`. Same contract as
    /// `penalize`.
    fn reward(&self, agent_id: &AgentId, tier: RiskTier) -> BastionResult<f64>;

    fn current(&self, agent_id: &AgentId) -> BastionResult<f64>;

    fn snapshot(&self, agent_id: &AgentId) -> BastionResult<TrustSnapshot>;
}
