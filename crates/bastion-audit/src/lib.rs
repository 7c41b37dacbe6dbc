//! # bastion-audit
//!
//! Append-only, SHA-256 hash-chained audit log and security alerts for the
//! BASTION runtime.
//!
//! ## Overview
//!
//! Every authorization decision the interceptor makes becomes an
//! `AuditRecord` in its agent's chain, linked to the previous record by hash.
//! Tampering with any record, even a single byte of its decision, breaks the
//! chain and is detected by `verify_chain`. Every denied record carries
//! exactly one `SecurityAlert`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bastion_audit::InMemoryAuditLog;
//! use bastion_core::traits::AuditLogger;
//!
//! let log = InMemoryAuditLog::new();
//! let id = log.record(&decision, RecordKind::Action)?;
//!
//! assert!(log.verify_integrity());
//! let export = log.export_log(&agent_id)?;
//! ```

pub mod chain;
pub mod memory;
pub mod stream;

pub use chain::{hash_record, verify_chain, ChainLink, GENESIS_HASH};
pub use memory::InMemoryAuditLog;
pub use stream::AuditLog;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use serde_json::json;

    use bastion_contracts::{
        action::ActionRequest,
        agent::AgentId,
        audit::{AlertId, AlertSeverity, AlertStatus, AuditFilter, ExecutionOutcome, RecordKind},
        decision::{AuthorizationDecision, RiskTier, Verdict},
        error::BastionError,
    };
    use bastion_core::traits::AuditLogger;

    use super::{InMemoryAuditLog, GENESIS_HASH};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn request(agent: &str, action_type: &str, resource: &str) -> ActionRequest {
        ActionRequest::new(AgentId::new(agent), action_type, resource)
            .with_context(json!({ "source": "test" }))
    }

    fn allowed(agent: &str, action_type: &str, resource: &str) -> AuthorizationDecision {
        AuthorizationDecision::allowed(request(agent, action_type, resource), RiskTier::Low)
    }

    fn denied(agent: &str, action_type: &str, resource: &str, tier: RiskTier) -> AuthorizationDecision {
        AuthorizationDecision::denied(request(agent, action_type, resource), tier)
    }

    fn agent() -> AgentId {
        AgentId::new("demo-agent")
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    /// Writing three records and verifying produces a valid chain.
    #[test]
    fn test_hash_chain_integrity() {
        let log = InMemoryAuditLog::new();
        log.record(&allowed("demo-agent", "api:call", "weather"), RecordKind::Action).unwrap();
        log.record(&allowed("demo-agent", "api:call", "search"), RecordKind::Action).unwrap();
        log.record(&denied("demo-agent", "file:write", "debug.txt", RiskTier::High), RecordKind::Action)
            .unwrap();

        assert!(log.verify_integrity(), "chain must be valid after sequential writes");
    }

    /// Mutating a stored decision breaks the chain.
    #[test]
    fn test_tamper_detection() {
        let log = InMemoryAuditLog::new();
        log.record(&denied("demo-agent", "file:read", "/etc/passwd", RiskTier::Low), RecordKind::Action)
            .unwrap();
        log.record(&allowed("demo-agent", "api:call", "weather"), RecordKind::Action).unwrap();

        // Rewrite history: make the denial look like an approval.
        {
            let streams = log.streams.read().unwrap();
            let mut stream = streams.get(&agent()).unwrap().lock().unwrap();
            stream.records[0].decision.verdict = Verdict::Allowed;
        }

        assert!(!log.verify_integrity(), "chain must detect tampering with a stored record");
    }

    /// Outcomes are attached after chaining and do not affect integrity.
    #[test]
    fn test_outcome_does_not_break_chain() {
        let log = InMemoryAuditLog::new();
        let id = log.record(&allowed("demo-agent", "api:call", "weather"), RecordKind::Action).unwrap();

        log.update_outcome(id, ExecutionOutcome::Succeeded).unwrap();

        assert!(log.verify_integrity());
        let record = log.query(&AuditFilter::default()).next().unwrap();
        assert_eq!(record.outcome, Some(ExecutionOutcome::Succeeded));
    }

    #[test]
    fn test_outcome_is_write_once() {
        let log = InMemoryAuditLog::new();
        let id = log.record(&allowed("demo-agent", "api:call", "weather"), RecordKind::Action).unwrap();

        log.update_outcome(id, ExecutionOutcome::Failed { reason: "timeout".into() }).unwrap();
        let second = log.update_outcome(id, ExecutionOutcome::Succeeded);

        assert!(matches!(second, Err(BastionError::OutcomeAlreadyRecorded { .. })));
        let record = log.query(&AuditFilter::default()).next().unwrap();
        assert_eq!(record.outcome, Some(ExecutionOutcome::Failed { reason: "timeout".into() }));
    }

    #[test]
    fn test_outcome_for_unknown_record() {
        let log = InMemoryAuditLog::new();
        let result = log.update_outcome(bastion_contracts::audit::AuditRecordId(42), ExecutionOutcome::Succeeded);
        assert!(matches!(result, Err(BastionError::AuditRecordNotFound { record_id: 42 })));
    }

    /// The first record of every agent chain links to the genesis hash.
    #[test]
    fn test_genesis_hash_per_agent() {
        let log = InMemoryAuditLog::new();
        log.record(&allowed("agent-a", "api:call", "x"), RecordKind::Action).unwrap();
        log.record(&allowed("agent-b", "api:call", "x"), RecordKind::Action).unwrap();

        for agent in ["agent-a", "agent-b"] {
            let export = log.export_log(&AgentId::new(agent)).unwrap();
            assert_eq!(export.records.len(), 1);
            assert_eq!(export.records[0].prev_hash, GENESIS_HASH);
            assert_eq!(export.records[0].sequence, 0);
        }
    }

    /// Record ids are unique across agents; sequences are per agent.
    #[test]
    fn test_ids_global_sequences_per_agent() {
        let log = InMemoryAuditLog::new();
        let a0 = log.record(&allowed("agent-a", "api:call", "x"), RecordKind::Action).unwrap();
        let b0 = log.record(&allowed("agent-b", "api:call", "x"), RecordKind::Action).unwrap();
        let a1 = log.record(&allowed("agent-a", "api:call", "y"), RecordKind::Action).unwrap();

        assert!(a0 < b0 && b0 < a1);

        let export = log.export_log(&AgentId::new("agent-a")).unwrap();
        let sequences: Vec<u64> = export.records.iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![0, 1]);
        assert_eq!(export.records[1].prev_hash, export.records[0].this_hash);
    }

    /// Every denial carries exactly one alert; approvals carry none.
    #[test]
    fn test_alert_per_denial() {
        let log = InMemoryAuditLog::new();
        log.record(&allowed("demo-agent", "api:call", "weather"), RecordKind::Action).unwrap();
        let denied_id = log
            .record(&denied("demo-agent", "payment:process", "order/9", RiskTier::High), RecordKind::Action)
            .unwrap();
        log.record(&denied("demo-agent", "file:read", "/etc/passwd", RiskTier::Low), RecordKind::Inquiry)
            .unwrap();

        let alerts: Vec<_> = log.alerts(&AuditFilter::for_agent(agent())).collect();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].record_id, denied_id);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[1].severity, AlertSeverity::Warning);
        assert!(alerts.iter().all(|a| a.is_blocked));

        // Raising again is idempotent.
        let again = log.raise_alert(denied_id).unwrap();
        assert_eq!(again.alert_id, alerts[0].alert_id);
        assert_eq!(log.alerts(&AuditFilter::default()).count(), 2);
    }

    #[test]
    fn test_no_alert_for_allowed_record() {
        let log = InMemoryAuditLog::new();
        let id = log.record(&allowed("demo-agent", "api:call", "weather"), RecordKind::Action).unwrap();

        assert!(log.raise_alert(id).is_err());
        assert_eq!(log.alerts(&AuditFilter::default()).count(), 0);
    }

    /// Alerts move open -> acknowledged -> resolved, and never back.
    #[test]
    fn test_alert_triage_is_write_once() {
        let log = InMemoryAuditLog::new();
        log.record(&denied("demo-agent", "user:delete", "user:12345", RiskTier::High), RecordKind::Action)
            .unwrap();
        let alert_id = log.alerts(&AuditFilter::default()).next().unwrap().alert_id;

        let acked = log.acknowledge_alert(alert_id, "oncall").unwrap();
        assert_eq!(acked.status, AlertStatus::Acknowledged);
        assert_eq!(acked.acknowledged_by.as_deref(), Some("oncall"));

        let resolved = log.resolve_alert(alert_id, "secops").unwrap();
        assert_eq!(resolved.status, AlertStatus::Resolved);
        assert_eq!(resolved.resolved_by.as_deref(), Some("secops"));

        let reopen = log.update_alert_status(alert_id, AlertStatus::Open, "attacker");
        assert!(matches!(reopen, Err(BastionError::InvalidAlertTransition { .. })));
        let relabel = log.update_alert_status(alert_id, AlertStatus::FalsePositive, "attacker");
        assert!(matches!(relabel, Err(BastionError::InvalidAlertTransition { .. })));

        // The stored alert keeps the first resolution; the chain is unaffected.
        let stored = log.alerts(&AuditFilter::default()).next().unwrap();
        assert_eq!(stored.status, AlertStatus::Resolved);
        assert_eq!(stored.resolved_by.as_deref(), Some("secops"));
        assert_eq!(stored.resolved_at, resolved.resolved_at);
        assert_eq!(log.export_log(&agent()).unwrap().alerts[0].status, AlertStatus::Resolved);
        assert!(log.verify_integrity());
    }

    #[test]
    fn test_unknown_alert_cannot_be_triaged() {
        let log = InMemoryAuditLog::new();
        log.record(&denied("demo-agent", "file:write", "x", RiskTier::Low), RecordKind::Action).unwrap();

        let result = log.resolve_alert(AlertId::new(), "secops");
        assert!(matches!(result, Err(BastionError::AlertNotFound { .. })));
    }

    /// Metrics count matching alerts by severity and open vs closed.
    #[test]
    fn test_alert_metrics() {
        let log = InMemoryAuditLog::new();
        log.record(&denied("agent-a", "payment:process", "order/1", RiskTier::High), RecordKind::Action)
            .unwrap();
        log.record(&denied("agent-a", "file:write", "x", RiskTier::Medium), RecordKind::Inquiry).unwrap();
        log.record(&denied("agent-a", "file:read", "y", RiskTier::Low), RecordKind::Action).unwrap();
        log.record(&denied("agent-b", "user:delete", "user:1", RiskTier::High), RecordKind::Action)
            .unwrap();
        log.record(&allowed("agent-b", "api:call", "weather"), RecordKind::Action).unwrap();

        let first = log.alerts(&AuditFilter::for_agent(AgentId::new("agent-a"))).next().unwrap();
        log.resolve_alert(first.alert_id, "secops").unwrap();

        let all = log.alert_metrics(&AuditFilter::default()).unwrap();
        assert_eq!(all.total, 4);
        assert_eq!(all.open, 3);
        assert_eq!(all.resolved, 1);
        assert_eq!(all.unresolved(), 3);
        assert_eq!(all.severity(AlertSeverity::Critical), 2);
        assert_eq!(all.severity(AlertSeverity::High), 1);
        assert_eq!(all.severity(AlertSeverity::Warning), 1);

        let agent_a = log.alert_metrics(&AuditFilter::for_agent(AgentId::new("agent-a"))).unwrap();
        assert_eq!(agent_a.total, 3);
        assert_eq!(agent_a.resolved, 1);

        let open = log.alert_metrics(&AuditFilter::default().status(AlertStatus::Open)).unwrap();
        assert_eq!(open.total, 3);
        assert_eq!(open.resolved, 0);

        let nobody = log.alert_metrics(&AuditFilter::for_agent(AgentId::new("nobody"))).unwrap();
        assert_eq!(nobody, Default::default());
    }

    /// Queries filter by agent, verdict, kind and time range.
    #[test]
    fn test_query_filters() {
        let log = InMemoryAuditLog::new();
        let start = Utc::now() - Duration::seconds(1);
        log.record(&allowed("agent-a", "api:call", "x"), RecordKind::Action).unwrap();
        log.record(&denied("agent-a", "file:write", "x", RiskTier::Medium), RecordKind::Action).unwrap();
        log.record(&denied("agent-a", "file:write", "x", RiskTier::Medium), RecordKind::Inquiry).unwrap();
        log.record(&allowed("agent-b", "api:call", "x"), RecordKind::Action).unwrap();
        let end = Utc::now() + Duration::seconds(1);

        assert_eq!(log.query(&AuditFilter::default()).count(), 4);
        assert_eq!(log.query(&AuditFilter::for_agent(AgentId::new("agent-a"))).count(), 3);
        assert_eq!(log.query(&AuditFilter::default().verdict(Verdict::Denied)).count(), 2);
        assert_eq!(
            log.query(&AuditFilter::for_agent(AgentId::new("agent-a")).kind(RecordKind::Inquiry)).count(),
            1
        );
        assert_eq!(log.query(&AuditFilter::default().between(start, end)).count(), 4);
        assert_eq!(log.query(&AuditFilter::default().between(end, end + Duration::seconds(5))).count(), 0);
        assert_eq!(log.query(&AuditFilter::for_agent(AgentId::new("nobody"))).count(), 0);
        assert_eq!(log.alerts(&AuditFilter::default().verdict(Verdict::Allowed)).count(), 0);
    }

    /// A query sees the records that existed when it was created and can be
    /// restarted by calling `query` again.
    #[test]
    fn test_query_is_finite_and_restartable() {
        let log = InMemoryAuditLog::new();
        log.record(&allowed("demo-agent", "api:call", "a"), RecordKind::Action).unwrap();
        log.record(&allowed("demo-agent", "api:call", "b"), RecordKind::Action).unwrap();

        let mut iter = log.query(&AuditFilter::default());
        assert_eq!(iter.next().unwrap().decision.request.resource, "a");

        log.record(&allowed("demo-agent", "api:call", "c"), RecordKind::Action).unwrap();

        assert_eq!(iter.next().unwrap().decision.request.resource, "b");
        assert!(iter.next().is_none());
        drop(iter);

        let resources: Vec<String> = log
            .query(&AuditFilter::default())
            .map(|r| r.decision.request.resource)
            .collect();
        assert_eq!(resources, vec!["a", "b", "c"]);
    }

    /// Timestamps never go backwards within an agent stream.
    #[test]
    fn test_timestamps_non_decreasing() {
        let log = InMemoryAuditLog::new();
        for i in 0..20 {
            log.record(&allowed("demo-agent", "api:call", &format!("r{}", i)), RecordKind::Action)
                .unwrap();
        }
        let records: Vec<_> = log.query(&AuditFilter::for_agent(agent())).collect();
        assert!(records.windows(2).all(|w| w[0].recorded_at <= w[1].recorded_at));
    }

    /// `export_log()` contains every record in order with the terminal hash.
    #[test]
    fn test_export_log() {
        let log = InMemoryAuditLog::new();
        log.record(&allowed("demo-agent", "api:call", "alpha"), RecordKind::Action).unwrap();
        log.record(&allowed("demo-agent", "api:call", "beta"), RecordKind::Action).unwrap();
        log.record(&denied("demo-agent", "user:delete", "user:12345", RiskTier::High), RecordKind::Action)
            .unwrap();

        let export = log.export_log(&agent()).unwrap();

        assert_eq!(export.agent_id, agent());
        assert_eq!(export.records.len(), 3);
        assert_eq!(export.alerts.len(), 1);
        assert_eq!(export.terminal_hash, export.records.last().unwrap().this_hash);
        assert!(export.verify(), "exported log must pass chain verification");
        assert!(super::verify_chain(&export.records));
    }

    /// An empty log is trivially valid.
    #[test]
    fn test_verify_empty() {
        let log = InMemoryAuditLog::new();
        assert!(log.verify_integrity(), "an empty log must be considered valid");
        assert!(log.is_empty().unwrap());
        assert!(log.agents().unwrap().is_empty());
        assert!(super::verify_chain(&[]));

        let export = log.export_log(&agent()).unwrap();
        assert!(export.records.is_empty());
        assert_eq!(export.terminal_hash, "");
    }

    /// A poisoned lock is reported, not mistaken for an empty log.
    #[test]
    fn test_poisoned_lock_is_an_error() {
        let log = InMemoryAuditLog::new();
        log.record(&allowed("demo-agent", "api:call", "weather"), RecordKind::Action).unwrap();

        let poisoner = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = log.streams.write().unwrap();
            panic!("writer died holding the stream map");
        }));
        assert!(poisoner.is_err());

        assert!(matches!(
            log.agents(),
            Err(BastionError::AuditWriteFailed { transient: false, .. })
        ));
        assert!(log.alert_metrics(&AuditFilter::default()).is_err());
        assert!(log.export_log(&agent()).is_err());
        assert_eq!(log.len().unwrap(), 1);
    }

    /// Concurrent writers for one agent produce one unbroken chain.
    #[test]
    fn test_concurrent_writes_chain_cleanly() {
        let log = InMemoryAuditLog::new();

        std::thread::scope(|s| {
            for t in 0..8 {
                let log = &log;
                s.spawn(move || {
                    for i in 0..25 {
                        let resource = format!("t{}-{}", t, i);
                        let decision = if i % 5 == 0 {
                            denied("demo-agent", "file:write", &resource, RiskTier::Medium)
                        } else {
                            allowed("demo-agent", "api:call", &resource)
                        };
                        log.record(&decision, RecordKind::Action).unwrap();
                    }
                });
            }
        });

        assert_eq!(log.len().unwrap(), 200);
        assert!(log.verify_integrity());
        assert_eq!(log.alerts(&AuditFilter::default()).count(), 40);

        let mut ids: Vec<_> = log.query(&AuditFilter::default()).map(|r| r.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 200);
    }
}
