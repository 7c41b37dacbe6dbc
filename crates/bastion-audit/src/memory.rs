//! In-memory implementation of `AuditLogger`.
//!
//! `InMemoryAuditLog` is the reference implementation of the `AuditLogger`
//! trait. Records are grouped into one `AgentStream` per agent, each behind
//! its own `Mutex`, so writes for unrelated agents never contend. Record ids
//! come from a single atomic counter shared by every stream.
//!
//! Queries are lazy: the iterator captures which streams exist and how long
//! each one is when it is created, then clones one record at a time, holding
//! a stream's lock only for the duration of a single `next()`.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tracing::{debug, info, warn};

use bastion_contracts::{
    agent::AgentId,
    audit::{
        AlertId, AlertMetrics, AlertStatus, AuditFilter, AuditRecord, AuditRecordId,
        ExecutionOutcome, RecordKind, SecurityAlert,
    },
    decision::{AuthorizationDecision, Verdict},
    error::{BastionError, BastionResult},
};
use bastion_core::traits::AuditLogger;

use crate::stream::{AgentStream, AuditLog};

type SharedStream = Arc<Mutex<AgentStream>>;

fn poisoned(what: &str) -> BastionError {
    BastionError::AuditWriteFailed {
        reason: format!("{} lock poisoned", what),
        transient: false,
    }
}

fn lock(stream: &SharedStream) -> BastionResult<MutexGuard<'_, AgentStream>> {
    stream.lock().map_err(|_| poisoned("audit stream"))
}

// ── Public log ────────────────────────────────────────────────────────────────

/// An in-memory, append-only audit log with one SHA-256 hash chain per agent.
///
/// # Thread safety
///
/// The stream map is read-locked on every write and write-locked only the
/// first time an agent is seen. Each stream has its own `Mutex`.
#[derive(Default)]
pub struct InMemoryAuditLog {
    next_id: AtomicU64,
    pub(crate) streams: RwLock<BTreeMap<AgentId, SharedStream>>,
    /// Record id → (agent, position in that agent's stream).
    index: RwLock<HashMap<AuditRecordId, (AgentId, usize)>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across every agent.
    pub fn len(&self) -> BastionResult<usize> {
        let index = self.index.read().map_err(|_| poisoned("audit index"))?;
        Ok(index.len())
    }

    pub fn is_empty(&self) -> BastionResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Agents that have at least one record, sorted.
    pub fn agents(&self) -> BastionResult<Vec<AgentId>> {
        let streams = self.streams.read().map_err(|_| poisoned("audit stream map"))?;
        Ok(streams.keys().cloned().collect())
    }

    /// Raise the security alert for a denied record.
    ///
    /// `record` already does this for every denial; calling it again for the
    /// same record returns the existing alert rather than creating a second.
    pub fn raise_alert(&self, record_id: AuditRecordId) -> BastionResult<SecurityAlert> {
        let (agent_id, position) = self.locate(record_id)?;
        let stream = self.stream(&agent_id)?.ok_or(BastionError::AuditRecordNotFound {
            record_id: record_id.0,
        })?;
        let mut guard = lock(&stream)?;
        guard.raise_alert(position)
    }

    /// Move an alert to `status`, recording `actor` as the one who did it.
    ///
    /// Alerts only move forward: open, then acknowledged, then resolved or
    /// false positive. A closed alert is never reopened.
    pub fn update_alert_status(
        &self,
        alert_id: AlertId,
        status: AlertStatus,
        actor: &str,
    ) -> BastionResult<SecurityAlert> {
        let streams: Vec<SharedStream> = self
            .streams
            .read()
            .map_err(|_| poisoned("audit stream map"))?
            .values()
            .cloned()
            .collect();

        for stream in &streams {
            let mut guard = lock(stream)?;
            let Some(alert) = guard.alerts.iter_mut().find(|a| a.alert_id == alert_id) else {
                continue;
            };
            let from = alert.status;
            if let Err(e) = alert.transition(status, actor) {
                warn!(
                    target: "bastion::security",
                    alert_id = %alert_id,
                    from = %from,
                    to = %status,
                    actor,
                    "rejected security alert transition"
                );
                return Err(e);
            }
            info!(
                target: "bastion::security",
                alert_id = %alert_id,
                agent_id = %alert.agent_id,
                from = %from,
                to = %status,
                actor,
                "security alert status changed"
            );
            return Ok(alert.clone());
        }

        Err(BastionError::AlertNotFound {
            alert_id: alert_id.to_string(),
        })
    }

    pub fn acknowledge_alert(&self, alert_id: AlertId, actor: &str) -> BastionResult<SecurityAlert> {
        self.update_alert_status(alert_id, AlertStatus::Acknowledged, actor)
    }

    pub fn resolve_alert(&self, alert_id: AlertId, actor: &str) -> BastionResult<SecurityAlert> {
        self.update_alert_status(alert_id, AlertStatus::Resolved, actor)
    }

    /// Count the alerts matching `filter` by severity and status.
    pub fn alert_metrics(&self, filter: &AuditFilter) -> BastionResult<AlertMetrics> {
        let selected: Vec<SharedStream> = {
            let streams = self.streams.read().map_err(|_| poisoned("audit stream map"))?;
            match &filter.agent_id {
                Some(agent_id) => streams.get(agent_id).cloned().into_iter().collect(),
                None => streams.values().cloned().collect(),
            }
        };

        let mut metrics = AlertMetrics::default();
        for stream in &selected {
            let guard = lock(stream)?;
            for alert in guard.alerts.iter().filter(|a| filter.matches_alert(a)) {
                metrics.add(alert);
            }
        }
        Ok(metrics)
    }

    /// Verify every agent's chain. An empty log is valid.
    pub fn verify_integrity(&self) -> bool {
        let Ok(streams) = self.streams.read() else {
            return false;
        };
        streams.iter().all(|(agent_id, stream)| {
            let intact = stream.lock().map(|s| s.verify()).unwrap_or(false);
            if !intact {
                warn!(
                    target: "bastion::security",
                    agent_id = %agent_id,
                    "audit chain failed verification"
                );
            }
            intact
        })
    }

    /// Export a sealed copy of one agent's stream.
    ///
    /// An agent with no records yields an empty log with an empty
    /// `terminal_hash`.
    pub fn export_log(&self, agent_id: &AgentId) -> BastionResult<AuditLog> {
        let log = match self.stream(agent_id)? {
            Some(stream) => {
                let guard = lock(&stream)?;
                AuditLog::seal(agent_id.clone(), Some(&*guard))
            }
            None => AuditLog::seal(agent_id.clone(), None),
        };
        info!(
            agent_id = %agent_id,
            record_count = log.records.len(),
            terminal_hash = %log.terminal_hash,
            "audit log exported"
        );
        Ok(log)
    }

    fn stream(&self, agent_id: &AgentId) -> BastionResult<Option<SharedStream>> {
        let streams = self.streams.read().map_err(|_| poisoned("audit stream map"))?;
        Ok(streams.get(agent_id).cloned())
    }

    fn stream_or_create(&self, agent_id: &AgentId) -> BastionResult<SharedStream> {
        if let Some(stream) = self.stream(agent_id)? {
            return Ok(stream);
        }
        let mut streams = self.streams.write().map_err(|_| poisoned("audit stream map"))?;
        let stream = streams
            .entry(agent_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(AgentStream::new())));
        Ok(Arc::clone(stream))
    }

    fn locate(&self, record_id: AuditRecordId) -> BastionResult<(AgentId, usize)> {
        self.index
            .read()
            .map_err(|_| poisoned("audit index"))?
            .get(&record_id)
            .cloned()
            .ok_or(BastionError::AuditRecordNotFound {
                record_id: record_id.0,
            })
    }

    /// Snapshot the streams a filter can touch, with their current lengths.
    fn cursor(&self, filter: &AuditFilter, len: fn(&AgentStream) -> usize) -> Cursor {
        let streams = match self.streams.read() {
            Ok(streams) => streams,
            Err(_) => return Cursor::default(),
        };
        let selected: Vec<SharedStream> = match &filter.agent_id {
            Some(agent_id) => streams.get(agent_id).cloned().into_iter().collect(),
            None => streams.values().cloned().collect(),
        };
        let streams = selected
            .into_iter()
            .filter_map(|stream| {
                let end = stream.lock().map(|s| len(&*s)).ok()?;
                Some((stream, end))
            })
            .collect();
        Cursor {
            streams,
            ..Cursor::default()
        }
    }
}

// ── AuditLogger impl ──────────────────────────────────────────────────────────

impl AuditLogger for InMemoryAuditLog {
    /// Chain one decision onto its agent's stream.
    ///
    /// The id, the append, and (for a denial) the alert all happen under the
    /// stream's lock, so a reader never sees a denied record without its
    /// alert.
    fn record(
        &self,
        decision: &AuthorizationDecision,
        kind: RecordKind,
    ) -> BastionResult<AuditRecordId> {
        let agent_id = &decision.request.agent_id;
        let stream = self.stream_or_create(agent_id)?;
        let mut guard = lock(&stream)?;

        let id = AuditRecordId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let position = guard.append(id, decision, kind)?;
        if decision.verdict == Verdict::Denied {
            let alert = guard.raise_alert(position)?;
            warn!(
                target: "bastion::security",
                agent_id = %agent_id,
                record_id = %id,
                severity = %alert.severity,
                action_type = %alert.action_type,
                resource = %alert.resource,
                "security alert raised"
            );
        }
        drop(guard);

        self.index
            .write()
            .map_err(|_| poisoned("audit index"))?
            .insert(id, (agent_id.clone(), position));

        debug!(
            agent_id = %agent_id,
            record_id = %id,
            kind = ?kind,
            verdict = %decision.verdict,
            "audit record written"
        );
        Ok(id)
    }

    fn update_outcome(&self, id: AuditRecordId, outcome: ExecutionOutcome) -> BastionResult<()> {
        let (agent_id, position) = self.locate(id)?;
        let stream = self
            .stream(&agent_id)?
            .ok_or(BastionError::AuditRecordNotFound { record_id: id.0 })?;
        let mut guard = lock(&stream)?;
        let record = guard
            .records
            .get_mut(position)
            .ok_or(BastionError::AuditRecordNotFound { record_id: id.0 })?;

        if record.outcome.is_some() {
            return Err(BastionError::OutcomeAlreadyRecorded { record_id: id.0 });
        }
        record.outcome = Some(outcome);
        Ok(())
    }

    fn query(&self, filter: &AuditFilter) -> Box<dyn Iterator<Item = AuditRecord> + Send + '_> {
        Box::new(RecordIter {
            cursor: self.cursor(filter, |s| s.records.len()),
            filter: filter.clone(),
        })
    }

    fn alerts(&self, filter: &AuditFilter) -> Box<dyn Iterator<Item = SecurityAlert> + Send + '_> {
        Box::new(AlertIter {
            cursor: self.cursor(filter, |s| s.alerts.len()),
            filter: filter.clone(),
        })
    }
}

// ── Lazy iteration ────────────────────────────────────────────────────────────

/// Position within a fixed set of stream prefixes.
#[derive(Default)]
struct Cursor {
    streams: Vec<(SharedStream, usize)>,
    stream: usize,
    position: usize,
}

impl Cursor {
    /// Fetch the next item in stream order, locking one stream briefly.
    fn advance<T>(&mut self, fetch: impl Fn(&AgentStream, usize) -> Option<T>) -> Option<T> {
        loop {
            let (stream, end) = self.streams.get(self.stream)?;
            if self.position >= *end {
                self.stream += 1;
                self.position = 0;
                continue;
            }
            let position = self.position;
            self.position += 1;
            let item = match stream.lock() {
                Ok(guard) => fetch(&*guard, position),
                // A poisoned stream ends early rather than failing the query.
                Err(_) => {
                    self.position = *end;
                    None
                }
            };
            if item.is_some() {
                return item;
            }
        }
    }
}

struct RecordIter {
    cursor: Cursor,
    filter: AuditFilter,
}

impl Iterator for RecordIter {
    type Item = AuditRecord;

    fn next(&mut self) -> Option<AuditRecord> {
        loop {
            let record = self.cursor.advance(|s, i| s.records.get(i).cloned())?;
            if self.filter.matches(&record) {
                return Some(record);
            }
        }
    }
}

struct AlertIter {
    cursor: Cursor,
    filter: AuditFilter,
}

impl Iterator for AlertIter {
    type Item = SecurityAlert;

    fn next(&mut self) -> Option<SecurityAlert> {
        loop {
            let alert = self.cursor.advance(|s, i| s.alerts.get(i).cloned())?;
            if self.filter.matches_alert(&alert) {
                return Some(alert);
            }
        }
    }
}
