//! Audit records, execution outcomes, and security alerts.
//!
//! `AuditRecord` mirrors one `AuthorizationDecision` plus, for executed
//! actions, the outcome of the underlying call. `SecurityAlert` is raised for
//! every denied decision and references the record that triggered it.
//!
//! Records are immutable once chained. Alerts are not part of the chain and
//! carry a triage status that moves forward only:
//!
//!   open → acknowledged → resolved | false_positive
//!
//! An open alert may also be closed directly. A closed alert never reopens.
//!
//! These types are the wire contract for dashboards: every field is public,
//! serializable, and named in snake_case.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    agent::AgentId,
    decision::{AuthorizationDecision, RiskTier, Verdict},
    error::{BastionError, BastionResult},
};

/// Monotonically assigned identifier of an audit record.
///
/// Unique across all agents within one audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditRecordId(pub u64);

impl fmt::Display for AuditRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a record was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// An intercepted action that was (or would have been) executed.
    Action,
    /// A verification pre-check. Nothing was executed.
    Inquiry,
}

/// What happened when an authorized action actually ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Succeeded,
    Failed {
        /// Display form of the error the action returned.
        reason: String,
    },
}

/// One append-only entry in an agent's audit stream.
///
/// Everything except `outcome` is fixed at creation. `outcome` starts as
/// `None` and may be attached exactly once after the action has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: AuditRecordId,
    pub kind: RecordKind,
    pub decision: AuthorizationDecision,
    pub outcome: Option<ExecutionOutcome>,
    /// Position in the owning agent's hash chain, starting at 0.
    pub sequence: u64,
    /// Wall-clock time the record was appended (UTC).
    ///
    /// Non-decreasing within one agent's stream.
    pub recorded_at: DateTime<Utc>,
    /// SHA-256 hash (hex) of the previous record in the agent's chain.
    pub prev_hash: String,
    /// SHA-256 hash (hex) of this record's immutable content.
    pub this_hash: String,
}

impl AuditRecord {
    pub fn agent_id(&self) -> &AgentId {
        &self.decision.request.agent_id
    }

    pub fn verdict(&self) -> Verdict {
        self.decision.verdict
    }
}

/// Alert severity, derived from the risk tier of the denied request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Warning,
    High,
    Critical,
}

impl From<RiskTier> for AlertSeverity {
    fn from(tier: RiskTier) -> Self {
        match tier {
            RiskTier::Low => AlertSeverity::Warning,
            RiskTier::Medium => AlertSeverity::High,
            RiskTier::High => AlertSeverity::Critical,
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertSeverity::Warning => "warning",
            AlertSeverity::High => "high",
            AlertSeverity::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Unique identifier for a security alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(pub uuid::Uuid);

impl AlertId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Default for AlertId {
    fn default() -> Self {
        Self::new()
    }
}

/// Triage state of a security alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    #[default]
    Open,
    Acknowledged,
    Resolved,
    FalsePositive,
}

impl AlertStatus {
    /// Resolved and false-positive alerts are closed for good.
    pub fn is_closed(&self) -> bool {
        matches!(self, AlertStatus::Resolved | AlertStatus::FalsePositive)
    }

    pub fn can_become(&self, next: AlertStatus) -> bool {
        match (*self, next) {
            (AlertStatus::Open, AlertStatus::Acknowledged) => true,
            (AlertStatus::Open | AlertStatus::Acknowledged, next) => next.is_closed(),
            _ => false,
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertStatus::Open => "open",
            AlertStatus::Acknowledged => "acknowledged",
            AlertStatus::Resolved => "resolved",
            AlertStatus::FalsePositive => "false_positive",
        };
        f.write_str(s)
    }
}

/// A violation raised for exactly one denied decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityAlert {
    pub alert_id: AlertId,
    /// The audit record whose decision was denied.
    pub record_id: AuditRecordId,
    pub agent_id: AgentId,
    pub severity: AlertSeverity,
    pub action_type: String,
    pub resource: String,
    pub reason: String,
    /// Whether the action was stopped. Always true for capability denials.
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,

    pub status: AlertStatus,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub acknowledged_by: Option<String>,
    /// Set once, when the alert is resolved or marked a false positive.
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
}

impl SecurityAlert {
    /// Build the alert for a denied record.
    pub fn for_record(record: &AuditRecord) -> Self {
        let decision = &record.decision;
        Self {
            alert_id: AlertId::new(),
            record_id: record.id,
            agent_id: decision.request.agent_id.clone(),
            severity: AlertSeverity::from(decision.risk_tier),
            action_type: decision.request.action_type.clone(),
            resource: decision.request.resource.clone(),
            reason: decision.reason.clone(),
            is_blocked: true,
            created_at: Utc::now(),
            status: AlertStatus::Open,
            acknowledged_at: None,
            acknowledged_by: None,
            resolved_at: None,
            resolved_by: None,
        }
    }

    /// Move the alert to `next`, stamping who did it and when.
    ///
    /// Fails with `InvalidAlertTransition` for anything but a forward move.
    pub fn transition(&mut self, next: AlertStatus, actor: &str) -> BastionResult<()> {
        if !self.status.can_become(next) {
            return Err(BastionError::InvalidAlertTransition {
                alert_id: self.alert_id.to_string(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        let now = Utc::now();
        if next.is_closed() {
            self.resolved_at = Some(now);
            self.resolved_by = Some(actor.to_string());
        } else {
            self.acknowledged_at = Some(now);
            self.acknowledged_by = Some(actor.to_string());
        }
        self.status = next;
        Ok(())
    }
}

/// Alert counts by severity and triage status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMetrics {
    pub total: usize,
    pub open: usize,
    pub acknowledged: usize,
    pub resolved: usize,
    pub false_positive: usize,
    pub by_severity: BTreeMap<AlertSeverity, usize>,
}

impl AlertMetrics {
    pub fn tally<'a>(alerts: impl IntoIterator<Item = &'a SecurityAlert>) -> Self {
        let mut metrics = Self::default();
        for alert in alerts {
            metrics.add(alert);
        }
        metrics
    }

    pub fn add(&mut self, alert: &SecurityAlert) {
        self.total += 1;
        match alert.status {
            AlertStatus::Open => self.open += 1,
            AlertStatus::Acknowledged => self.acknowledged += 1,
            AlertStatus::Resolved => self.resolved += 1,
            AlertStatus::FalsePositive => self.false_positive += 1,
        }
        *self.by_severity.entry(alert.severity).or_insert(0) += 1;
    }

    /// Alerts not yet closed.
    pub fn unresolved(&self) -> usize {
        self.open + self.acknowledged
    }

    pub fn severity(&self, severity: AlertSeverity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }
}

/// Selection criteria for audit queries. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFilter {
    pub agent_id: Option<AgentId>,
    /// Inclusive lower bound on `recorded_at` / `created_at`.
    pub since: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `recorded_at` / `created_at`.
    pub until: Option<DateTime<Utc>>,
    pub verdict: Option<Verdict>,
    pub kind: Option<RecordKind>,
    /// Applies to alerts only.
    pub status: Option<AlertStatus>,
}

impl AuditFilter {
    pub fn for_agent(agent_id: AgentId) -> Self {
        Self {
            agent_id: Some(agent_id),
            ..Self::default()
        }
    }

    pub fn verdict(mut self, verdict: Verdict) -> Self {
        self.verdict = Some(verdict);
        self
    }

    pub fn kind(mut self, kind: RecordKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn status(mut self, status: AlertStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn between(mut self, since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self.until = Some(until);
        self
    }

    fn in_range(&self, at: DateTime<Utc>) -> bool {
        self.since.map_or(true, |since| at >= since) && self.until.map_or(true, |until| at < until)
    }

    /// Return true if `record` satisfies every set criterion.
    pub fn matches(&self, record: &AuditRecord) -> bool {
        self.agent_id.as_ref().map_or(true, |id| record.agent_id() == id)
            && self.verdict.map_or(true, |v| record.verdict() == v)
            && self.kind.map_or(true, |k| record.kind == k)
            && self.in_range(record.recorded_at)
    }

    /// Return true if `alert` satisfies the agent, status and time criteria.
    ///
    /// Alerts only exist for denials, so a verdict of `Allowed` matches none.
    /// The kind criterion is not applied to alerts.
    pub fn matches_alert(&self, alert: &SecurityAlert) -> bool {
        self.agent_id.as_ref().map_or(true, |id| &alert.agent_id == id)
            && self.verdict.map_or(true, |v| v == Verdict::Denied)
            && self.status.map_or(true, |s| alert.status == s)
            && self.in_range(alert.created_at)
    }
}
