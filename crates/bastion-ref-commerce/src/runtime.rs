//! Wiring for the reference pack.
//!
//! `CommerceRuntime` builds every BASTION component from one TOML document,
//! registers the agents it declares, and keeps concrete handles to the audit
//! log and trust engine for reporting.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use bastion_audit::InMemoryAuditLog;
use bastion_contracts::{
    agent::AgentId,
    error::{BastionError, BastionResult},
};
use bastion_core::{ActionCatalog, AgentSession, Interceptor, InterceptorConfig};
use bastion_policy::{InMemoryCapabilityRegistry, PolicyConfig, RuleClassifier};
use bastion_trust::{TrustEngine, TrustPolicy};

use crate::actions::{catalog, CommerceAgent};

/// The built-in configuration.
pub const DEMO_CONFIG: &str = include_str!("../policies/demo-agent.toml");

/// The agent the demo drives.
pub const DEMO_AGENT: &str = "demo-agent";

pub struct CommerceRuntime {
    interceptor: Arc<Interceptor>,
    catalog: Arc<ActionCatalog>,
    registry: Arc<InMemoryCapabilityRegistry>,
    audit: Arc<InMemoryAuditLog>,
    trust: Arc<TrustEngine>,
}

impl CommerceRuntime {
    /// Build a runtime from the built-in configuration.
    pub fn demo() -> BastionResult<Self> {
        Self::from_toml_str(DEMO_CONFIG)
    }

    pub fn from_file(path: &Path) -> BastionResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| BastionError::ConfigError {
            reason: format!("failed to read configuration file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Build a runtime from a full configuration document.
    ///
    /// Agents declared in `[[agents]]` are registered through the interceptor
    /// so each one is enrolled for trust scoring.
    pub fn from_toml_str(s: &str) -> BastionResult<Self> {
        let policy = PolicyConfig::from_toml_str(s)?;
        let trust_policy = TrustPolicy::from_toml_str(s)?;
        let interceptor_config = InterceptorConfig::from_toml_str(s)?;

        let registry = Arc::new(InMemoryCapabilityRegistry::new(policy.registry.on_conflict));
        let audit = Arc::new(InMemoryAuditLog::new());
        let trust = Arc::new(TrustEngine::new(trust_policy)?);

        let interceptor = Interceptor::new(
            registry.clone(),
            Arc::new(RuleClassifier::from_config(&policy)),
            audit.clone(),
            trust.clone(),
        )
        .with_config(interceptor_config);

        for manifest in &policy.agents {
            interceptor.register_agent(manifest.agent_id.clone(), manifest.capability_set())?;
        }

        info!(agents = policy.agents.len(), "commerce runtime ready");

        Ok(Self {
            interceptor: Arc::new(interceptor),
            catalog: Arc::new(catalog()?),
            registry,
            audit,
            trust,
        })
    }

    pub fn interceptor(&self) -> &Arc<Interceptor> {
        &self.interceptor
    }

    pub fn registry(&self) -> &InMemoryCapabilityRegistry {
        &self.registry
    }

    pub fn audit(&self) -> &InMemoryAuditLog {
        &self.audit
    }

    pub fn trust(&self) -> &TrustEngine {
        &self.trust
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    /// Open a session for a registered agent.
    pub fn session(&self, agent_id: &str) -> BastionResult<AgentSession> {
        AgentSession::open(
            Arc::clone(&self.interceptor),
            Arc::clone(&self.catalog),
            AgentId::new(agent_id),
        )
    }

    /// The typed action surface for a registered agent.
    pub fn agent(&self, agent_id: &str) -> BastionResult<CommerceAgent> {
        CommerceAgent::new(self.session(agent_id)?)
    }
}
