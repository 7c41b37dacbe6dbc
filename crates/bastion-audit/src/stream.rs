//! Per-agent audit streams and the sealed log export.
//!
//! An `AgentStream` holds one agent's hash-chained records together with the
//! alerts raised against them. `AuditLog` is the sealed copy handed out by
//! `InMemoryAuditLog::export_log`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bastion_contracts::{
    agent::AgentId,
    audit::{AuditRecord, AuditRecordId, RecordKind, SecurityAlert},
    decision::{AuthorizationDecision, Verdict},
    error::{BastionError, BastionResult},
};

use crate::chain::{hash_record, verify_chain, ChainLink, GENESIS_HASH};

pub(crate) struct AgentStream {
    /// Every record for this agent, in chain order (sequence 0 first).
    pub(crate) records: Vec<AuditRecord>,

    pub(crate) alerts: Vec<SecurityAlert>,

    /// The `this_hash` of the last record, or `GENESIS_HASH` before any.
    pub(crate) last_hash: String,
}

impl AgentStream {
    pub(crate) fn new() -> Self {
        Self {
            records: Vec::new(),
            alerts: Vec::new(),
            last_hash: GENESIS_HASH.to_string(),
        }
    }

    /// Chain a new record onto this stream and return its position.
    ///
    /// `recorded_at` is clamped so timestamps never go backwards within the
    /// stream, even if the wall clock does.
    pub(crate) fn append(
        &mut self,
        id: AuditRecordId,
        decision: &AuthorizationDecision,
        kind: RecordKind,
    ) -> BastionResult<usize> {
        let now = Utc::now();
        let recorded_at = match self.records.last() {
            Some(last) if last.recorded_at > now => last.recorded_at,
            _ => now,
        };
        let sequence = self.records.len() as u64;

        let this_hash = hash_record(&ChainLink {
            id,
            agent_id: &decision.request.agent_id,
            sequence,
            prev_hash: &self.last_hash,
            kind,
            recorded_at,
            decision,
        })?;

        self.records.push(AuditRecord {
            id,
            kind,
            decision: decision.clone(),
            outcome: None,
            sequence,
            recorded_at,
            prev_hash: std::mem::replace(&mut self.last_hash, this_hash.clone()),
            this_hash,
        });
        Ok(self.records.len() - 1)
    }

    /// Raise the alert for the denied record at `position`.
    ///
    /// At most one alert exists per record; a second call returns the first.
    pub(crate) fn raise_alert(&mut self, position: usize) -> BastionResult<SecurityAlert> {
        let record = self.records.get(position).ok_or_else(|| BastionError::AuditWriteFailed {
            reason: format!("stream position {} out of range", position),
            transient: false,
        })?;

        if record.verdict() != Verdict::Denied {
            return Err(BastionError::AuditWriteFailed {
                reason: format!("record {} was allowed; only denials raise alerts", record.id),
                transient: false,
            });
        }

        if let Some(existing) = self.alerts.iter().find(|a| a.record_id == record.id) {
            return Ok(existing.clone());
        }

        let alert = SecurityAlert::for_record(record);
        self.alerts.push(alert.clone());
        Ok(alert)
    }

    pub(crate) fn verify(&self) -> bool {
        verify_chain(&self.records)
    }
}

/// A sealed export of one agent's audit stream.
///
/// The `terminal_hash` is the `this_hash` of the last record and can be used
/// as a compact commitment to the entire stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub agent_id: AgentId,

    /// All records in chain order (sequence 0 first).
    pub records: Vec<AuditRecord>,

    pub alerts: Vec<SecurityAlert>,

    /// Wall-clock time (UTC) the log was exported.
    pub finalized_at: DateTime<Utc>,

    /// The `this_hash` of the last record. Empty string if the log is empty.
    pub terminal_hash: String,
}

impl AuditLog {
    pub(crate) fn seal(agent_id: AgentId, stream: Option<&AgentStream>) -> Self {
        let (records, alerts) = stream
            .map(|s| (s.records.clone(), s.alerts.clone()))
            .unwrap_or_default();
        let terminal_hash = records.last().map(|r| r.this_hash.clone()).unwrap_or_default();

        Self {
            agent_id,
            records,
            alerts,
            finalized_at: Utc::now(),
            terminal_hash,
        }
    }

    /// Re-verify the exported chain.
    pub fn verify(&self) -> bool {
        verify_chain(&self.records)
    }
}
