//! Mock implementations of the core traits, shared by this crate's tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;

use bastion_contracts::{
    agent::{AgentId, AgentRegistration},
    audit::{
        AuditFilter, AuditRecord, AuditRecordId, ExecutionOutcome, RecordKind, SecurityAlert,
    },
    capability::CapabilitySet,
    decision::{AuthorizationDecision, RiskTier, Verdict},
    error::{BastionError, BastionResult},
    trust::TrustSnapshot,
};

use crate::{
    config::InterceptorConfig,
    interceptor::Interceptor,
    traits::{AuditLogger, CapabilityRegistry, RiskClassifier, TrustLedger},
};

/// A registry that overwrites on re-registration.
#[derive(Default)]
pub struct MockRegistry {
    agents: RwLock<HashMap<AgentId, AgentRegistration>>,
}

impl CapabilityRegistry for MockRegistry {
    fn register(
        &self,
        agent_id: AgentId,
        capabilities: CapabilitySet,
    ) -> BastionResult<AgentRegistration> {
        let registration = AgentRegistration {
            agent_id: agent_id.clone(),
            capabilities,
            registered_at: Utc::now(),
        };
        self.agents.write().unwrap().insert(agent_id, registration.clone());
        Ok(registration)
    }

    fn deregister(&self, agent_id: &AgentId) -> BastionResult<AgentRegistration> {
        self.agents
            .write()
            .unwrap()
            .remove(agent_id)
            .ok_or_else(|| BastionError::UnknownAgent { agent_id: agent_id.0.clone() })
    }

    fn registration(&self, agent_id: &AgentId) -> BastionResult<AgentRegistration> {
        self.agents
            .read()
            .unwrap()
            .get(agent_id)
            .cloned()
            .ok_or_else(|| BastionError::UnknownAgent { agent_id: agent_id.0.clone() })
    }

    fn authorize(
        &self,
        agent_id: &AgentId,
        action_type: &str,
        resource: &str,
    ) -> BastionResult<bool> {
        Ok(self.registration(agent_id)?.capabilities.permits(action_type, resource))
    }
}

/// Floors anything under `payment:` at `High`; otherwise keeps the declared tier.
pub struct MockClassifier;

impl RiskClassifier for MockClassifier {
    fn classify(&self, action_type: &str, declared: RiskTier) -> RiskTier {
        if action_type.starts_with("payment:") {
            declared.max(RiskTier::High)
        } else {
            declared
        }
    }
}

#[derive(Default)]
struct MockAuditState {
    records: Vec<AuditRecord>,
    alerts: Vec<SecurityAlert>,
    fail_remaining: u32,
    fail_transient: bool,
    record_attempts: u32,
}

/// An audit logger that keeps everything in memory and can be told to fail.
#[derive(Default)]
pub struct MockAudit {
    state: Mutex<MockAuditState>,
}

impl MockAudit {
    /// Make the next `count` calls to `record` fail.
    pub fn fail_next_records(&self, count: u32, transient: bool) {
        let mut state = self.state.lock().unwrap();
        state.fail_remaining = count;
        state.fail_transient = transient;
    }

    pub fn record_attempts(&self) -> u32 {
        self.state.lock().unwrap().record_attempts
    }
}

impl AuditLogger for MockAudit {
    fn record(
        &self,
        decision: &AuthorizationDecision,
        kind: RecordKind,
    ) -> BastionResult<AuditRecordId> {
        let mut state = self.state.lock().unwrap();
        state.record_attempts += 1;
        if state.fail_remaining > 0 {
            state.fail_remaining -= 1;
            return Err(BastionError::AuditWriteFailed {
                reason: "mock store unavailable".to_string(),
                transient: state.fail_transient,
            });
        }

        let id = AuditRecordId(state.records.len() as u64);
        let record = AuditRecord {
            id,
            kind,
            decision: decision.clone(),
            outcome: None,
            sequence: id.0,
            recorded_at: Utc::now(),
            prev_hash: String::new(),
            this_hash: String::new(),
        };
        if decision.verdict == Verdict::Denied {
            let alert = SecurityAlert::for_record(&record);
            state.alerts.push(alert);
        }
        state.records.push(record);
        Ok(id)
    }

    fn update_outcome(&self, id: AuditRecordId, outcome: ExecutionOutcome) -> BastionResult<()> {
        let mut state = self.state.lock().unwrap();
        let record = state
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(BastionError::AuditRecordNotFound { record_id: id.0 })?;
        if record.outcome.is_some() {
            return Err(BastionError::OutcomeAlreadyRecorded { record_id: id.0 });
        }
        record.outcome = Some(outcome);
        Ok(())
    }

    fn query(&self, filter: &AuditFilter) -> Box<dyn Iterator<Item = AuditRecord> + Send + '_> {
        let state = self.state.lock().unwrap();
        let matching: Vec<_> = state.records.iter().filter(|r| filter.matches(r)).cloned().collect();
        Box::new(matching.into_iter())
    }

    fn alerts(&self, filter: &AuditFilter) -> Box<dyn Iterator<Item = SecurityAlert> + Send + '_> {
        let state = self.state.lock().unwrap();
        let matching: Vec<_> =
            state.alerts.iter().filter(|a| filter.matches_alert(a)).cloned().collect();
        Box::new(matching.into_iter())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MockTrustCall {
    Enroll(AgentId),
    Retire(AgentId),
    Penalize(AgentId, RiskTier),
    Reward(AgentId, RiskTier),
}

/// A trust ledger that only remembers what it was asked to do.
#[derive(Default)]
pub struct MockTrust {
    calls: Mutex<Vec<MockTrustCall>>,
}

impl MockTrust {
    pub fn calls(&self) -> Vec<MockTrustCall> {
        self.calls.lock().unwrap().clone()
    }

    fn snapshot_of(agent_id: &AgentId) -> TrustSnapshot {
        TrustSnapshot {
            agent_id: agent_id.clone(),
            score: 50.0,
            violation_count: 0,
            success_count: 0,
            last_active: None,
        }
    }
}

impl TrustLedger for MockTrust {
    fn enroll(&self, agent_id: &AgentId) -> BastionResult<f64> {
        self.calls.lock().unwrap().push(MockTrustCall::Enroll(agent_id.clone()));
        Ok(50.0)
    }

    fn retire(&self, agent_id: &AgentId) -> Option<TrustSnapshot> {
        self.calls.lock().unwrap().push(MockTrustCall::Retire(agent_id.clone()));
        Some(Self::snapshot_of(agent_id))
    }

    fn penalize(&self, agent_id: &AgentId, tier: RiskTier) -> BastionResult<f64> {
        self.calls.lock().unwrap().push(MockTrustCall::Penalize(agent_id.clone(), tier));
        Ok(50.0)
    }

    fn reward(&self, agent_id: &AgentId, tier: RiskTier) -> BastionResult<f64> {
        self.calls.lock().unwrap().push(MockTrustCall::Reward(agent_id.clone(), tier));
        Ok(50.0)
    }

    fn current(&self, _agent_id: &AgentId) -> BastionResult<f64> {
        Ok(50.0)
    }

    fn snapshot(&self, agent_id: &AgentId) -> BastionResult<TrustSnapshot> {
        Ok(Self::snapshot_of(agent_id))
    }
}

/// An interceptor wired to fresh mocks, with handles kept for inspection.
pub struct Harness {
    pub registry: Arc<MockRegistry>,
    pub audit: Arc<MockAudit>,
    pub trust: Arc<MockTrust>,
    pub interceptor: Interceptor,
}

impl Harness {
    pub fn empty() -> Self {
        let registry = Arc::new(MockRegistry::default());
        let audit = Arc::new(MockAudit::default());
        let trust = Arc::new(MockTrust::default());
        let interceptor = Interceptor::new(
            registry.clone(),
            Arc::new(MockClassifier),
            audit.clone(),
            trust.clone(),
        );
        Self { registry, audit, trust, interceptor }
    }

    /// A harness with `agent_id` already registered. The registration goes
    /// straight to the registry, so the trust mock starts with no calls.
    pub fn with_agent(agent_id: AgentId, capabilities: CapabilitySet) -> Self {
        let harness = Self::empty();
        harness.registry.register(agent_id, capabilities).unwrap();
        harness
    }

    /// Another interceptor over the same mocks with a different configuration.
    pub fn rebuild(&self, config: InterceptorConfig) -> Interceptor {
        Interceptor::new(
            self.registry.clone(),
            Arc::new(MockClassifier),
            self.audit.clone(),
            self.trust.clone(),
        )
        .with_config(config)
    }
}
