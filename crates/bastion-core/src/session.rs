//! Declared actions and per-agent session handles.
//!
//! Business actions declare their metadata once, as an `ActionSpec` in an
//! `ActionCatalog`. An `AgentSession` binds one registered agent to the shared
//! interceptor and catalog; `AgentSession::track` hands out `TrackedAction`s
//! whose every invocation is routed through `Interceptor::intercept`.
//!
//! ```rust,ignore
//! let mut catalog = ActionCatalog::new();
//! catalog.register(ActionSpec::new("query_orders", "database:read").risk_level(RiskTier::Medium))?;
//!
//! let session = AgentSession::open(interceptor, Arc::new(catalog), AgentId::new("demo-agent"))?;
//! let orders = session.track("query_orders")?;
//! let result = orders.invoke_on("users/456", json!({}), || lookup_orders("456"))?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use bastion_contracts::{
    action::ActionSpec,
    agent::AgentId,
    audit::{AuditFilter, AuditRecord, SecurityAlert},
    error::{BastionError, BastionResult},
    trust::TrustSnapshot,
    verify::VerificationResponse,
};

use crate::interceptor::{ActionError, Interceptor};

/// Every action the hosting application has declared, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    specs: BTreeMap<String, Arc<ActionSpec>>,
}

impl ActionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an action. Names are unique; redeclaring one is a
    /// `ConfigError`.
    pub fn register(&mut self, spec: ActionSpec) -> BastionResult<()> {
        if spec.action_type.is_empty() {
            return Err(BastionError::ConfigError {
                reason: format!("action '{}' declares an empty action type", spec.name),
            });
        }
        if self.specs.contains_key(&spec.name) {
            return Err(BastionError::ConfigError {
                reason: format!("action '{}' is already declared", spec.name),
            });
        }
        self.specs.insert(spec.name.clone(), Arc::new(spec));
        Ok(())
    }

    pub fn get(&self, name: &str) -> BastionResult<Arc<ActionSpec>> {
        self.specs.get(name).cloned().ok_or_else(|| BastionError::ConfigError {
            reason: format!("action '{}' has not been declared", name),
        })
    }

    /// All declared actions, in name order.
    pub fn specs(&self) -> impl Iterator<Item = &ActionSpec> {
        self.specs.values().map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// A registered agent's handle onto the runtime.
#[derive(Clone)]
pub struct AgentSession {
    agent_id: AgentId,
    interceptor: Arc<Interceptor>,
    catalog: Arc<ActionCatalog>,
}

impl AgentSession {
    /// Open a session for an agent that is already registered.
    ///
    /// Fails with `UnknownAgent` otherwise.
    pub fn open(
        interceptor: Arc<Interceptor>,
        catalog: Arc<ActionCatalog>,
        agent_id: AgentId,
    ) -> BastionResult<Self> {
        interceptor.registry().registration(&agent_id)?;
        Ok(Self {
            agent_id,
            interceptor,
            catalog,
        })
    }

    pub fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    pub fn interceptor(&self) -> &Arc<Interceptor> {
        &self.interceptor
    }

    /// Bind the declared action `name` to this agent.
    pub fn track(&self, name: &str) -> BastionResult<TrackedAction> {
        Ok(TrackedAction {
            agent_id: self.agent_id.clone(),
            spec: self.catalog.get(name)?,
            interceptor: Arc::clone(&self.interceptor),
        })
    }

    /// Pre-check an action without executing it.
    pub fn verify_action(
        &self,
        action_type: &str,
        resource: &str,
        context: serde_json::Value,
    ) -> BastionResult<VerificationResponse> {
        self.interceptor.verify(&self.agent_id, action_type, resource, context)
    }

    pub fn trust(&self) -> BastionResult<TrustSnapshot> {
        self.interceptor.trust().snapshot(&self.agent_id)
    }

    /// This agent's audit trail, oldest first within its stream.
    pub fn activity(&self) -> Vec<AuditRecord> {
        self.interceptor
            .audit()
            .query(&AuditFilter::for_agent(self.agent_id.clone()))
            .collect()
    }

    /// This agent's security alerts.
    pub fn violations(&self) -> Vec<SecurityAlert> {
        self.interceptor
            .audit()
            .alerts(&AuditFilter::for_agent(self.agent_id.clone()))
            .collect()
    }
}

/// A declared action bound to one agent.
///
/// Calling it is indistinguishable from calling the underlying function,
/// except that the interceptor decides whether the function runs at all.
#[derive(Clone)]
pub struct TrackedAction {
    agent_id: AgentId,
    spec: Arc<ActionSpec>,
    interceptor: Arc<Interceptor>,
}

impl TrackedAction {
    pub fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    /// Invoke against the action's default resource.
    pub fn invoke<T, E, F>(&self, context: serde_json::Value, execute: F) -> BastionResult<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<ActionError>,
    {
        let resource = self.spec.default_resource().to_string();
        self.invoke_on(resource, context, execute)
    }

    /// Invoke against an explicit resource.
    pub fn invoke_on<T, E, F>(
        &self,
        resource: impl Into<String>,
        context: serde_json::Value,
        execute: F,
    ) -> BastionResult<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<ActionError>,
    {
        let request = self.spec.to_request(self.agent_id.clone(), resource, context);
        self.interceptor.intercept(request, execute)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
