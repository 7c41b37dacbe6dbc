//! In-memory capability registry.
//!
//! `InMemoryCapabilityRegistry` implements the `CapabilityRegistry` trait from
//! bastion-core. Lookups take a shared read lock; registration and removal
//! take the write lock, so the "already registered?" check and the insert are
//! a single critical section.
//!
//! Authorization algorithm:
//!
//! 1. Look up the agent. Never registered → `UnknownAgent`.
//! 2. Scan the agent's grants for one whose action type equals the requested
//!    type exactly and whose resource pattern (if any) matches the resource.
//! 3. No such grant → `false` (deny by default).

use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, info};

use bastion_contracts::{
    agent::{AgentId, AgentRegistration},
    capability::CapabilitySet,
    error::{BastionError, BastionResult},
};
use bastion_core::traits::CapabilityRegistry;

use crate::manifest::{PolicyConfig, RegistrationMode};

/// A `CapabilityRegistry` backed by a read-mostly map.
///
/// Construct empty with `new`, or pre-populated from the `[[agents]]` tables
/// of a TOML document via `from_toml_str` / `from_file`.
#[derive(Debug, Default)]
pub struct InMemoryCapabilityRegistry {
    mode: RegistrationMode,
    agents: RwLock<HashMap<AgentId, AgentRegistration>>,
}

impl InMemoryCapabilityRegistry {
    pub fn new(mode: RegistrationMode) -> Self {
        Self {
            mode,
            agents: RwLock::new(HashMap::new()),
        }
    }

    /// Build a registry holding every agent declared in `config`.
    ///
    /// An agent declared twice is a `ConfigError` under `reject`; under
    /// `replace` the later declaration wins.
    pub fn from_config(config: &PolicyConfig) -> BastionResult<Self> {
        let registry = Self::new(config.registry.on_conflict);
        for manifest in &config.agents {
            registry
                .register(manifest.agent_id.clone(), manifest.capability_set())
                .map_err(|e| match e {
                    BastionError::AlreadyRegistered { agent_id } => BastionError::ConfigError {
                        reason: format!("agent '{}' is declared more than once", agent_id),
                    },
                    other => other,
                })?;
        }
        Ok(registry)
    }

    pub fn from_toml_str(s: &str) -> BastionResult<Self> {
        Self::from_config(&PolicyConfig::from_toml_str(s)?)
    }

    pub fn from_file(path: &Path) -> BastionResult<Self> {
        Self::from_config(&PolicyConfig::from_file(path)?)
    }

    pub fn mode(&self) -> RegistrationMode {
        self.mode
    }

    /// Registered agent ids, sorted.
    pub fn agents(&self) -> BastionResult<Vec<AgentId>> {
        let mut ids: Vec<AgentId> = self.read()?.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    pub fn capabilities(&self, agent_id: &AgentId) -> BastionResult<CapabilitySet> {
        Ok(self.registration(agent_id)?.capabilities)
    }

    fn read(&self) -> BastionResult<RwLockReadGuard<'_, HashMap<AgentId, AgentRegistration>>> {
        self.agents.read().map_err(|_| BastionError::ConfigError {
            reason: "capability registry lock poisoned".to_string(),
        })
    }

    fn write(&self) -> BastionResult<RwLockWriteGuard<'_, HashMap<AgentId, AgentRegistration>>> {
        self.agents.write().map_err(|_| BastionError::ConfigError {
            reason: "capability registry lock poisoned".to_string(),
        })
    }
}

fn unknown(agent_id: &AgentId) -> BastionError {
    BastionError::UnknownAgent {
        agent_id: agent_id.0.clone(),
    }
}

impl CapabilityRegistry for InMemoryCapabilityRegistry {
    fn register(
        &self,
        agent_id: AgentId,
        capabilities: CapabilitySet,
    ) -> BastionResult<AgentRegistration> {
        let mut agents = self.write()?;

        if agents.contains_key(&agent_id) && self.mode == RegistrationMode::Reject {
            return Err(BastionError::AlreadyRegistered {
                agent_id: agent_id.0,
            });
        }

        let registration = AgentRegistration {
            agent_id: agent_id.clone(),
            capabilities,
            registered_at: Utc::now(),
        };
        let replaced = agents.insert(agent_id, registration.clone()).is_some();

        info!(
            agent_id = %registration.agent_id,
            capabilities = registration.capabilities.len(),
            replaced,
            "agent registered"
        );
        Ok(registration)
    }

    fn deregister(&self, agent_id: &AgentId) -> BastionResult<AgentRegistration> {
        let removed = self.write()?.remove(agent_id).ok_or_else(|| unknown(agent_id))?;
        info!(agent_id = %agent_id, "agent deregistered");
        Ok(removed)
    }

    fn registration(&self, agent_id: &AgentId) -> BastionResult<AgentRegistration> {
        self.read()?.get(agent_id).cloned().ok_or_else(|| unknown(agent_id))
    }

    fn authorize(
        &self,
        agent_id: &AgentId,
        action_type: &str,
        resource: &str,
    ) -> BastionResult<bool> {
        let agents = self.read()?;
        let registration = agents.get(agent_id).ok_or_else(|| unknown(agent_id))?;
        let granted = registration.capabilities.permits(action_type, resource);

        debug!(
            agent_id = %agent_id,
            action_type = %action_type,
            resource = %resource,
            granted,
            "capability lookup"
        );
        Ok(granted)
    }
}
