//! Capability manifest and escalation schema.
//!
//! A `PolicyConfig` is deserialized from the runtime's TOML document. It owns
//! the `[registry]`, `[classifier]`, `[[agents]]` and `[[escalations]]`
//! tables; the `[trust]` and `[audit]` tables belong to other crates and are
//! ignored here.
//!
//! Example:
//! ```toml
//! [registry]
//! on_conflict = "reject"
//!
//! [[agents]]
//! agent_id = "demo-agent"
//!
//! [[agents.capabilities]]
//! action_type = "database:read"
//! resource = "users/*"
//!
//! [[escalations]]
//! action = "file:*"
//! floor = "medium"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use bastion_contracts::{
    agent::AgentId,
    capability::{Capability, CapabilitySet},
    decision::RiskTier,
    error::{BastionError, BastionResult},
};

/// What the registry does when an already-registered agent registers again.
///
/// ```toml
/// on_conflict = "reject"
/// on_conflict = "replace"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistrationMode {
    /// Fail with `AlreadyRegistered`; the existing grant stays in force.
    #[default]
    Reject,
    /// Overwrite the capability set. Trust state is untouched.
    Replace,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySettings {
    #[serde(default)]
    pub on_conflict: RegistrationMode,
}

/// One agent's declared grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentManifest {
    pub agent_id: AgentId,

    /// Every capability the agent declares. An empty list registers an agent
    /// that is denied everything.
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

impl AgentManifest {
    pub fn capability_set(&self) -> CapabilitySet {
        self.capabilities.iter().cloned().collect()
    }
}

/// Raises any action whose type matches `action` to at least `floor`.
///
/// `action` is an exact action type, or a prefix ending in a single `*`
/// (`"payment:*"`). A lone `"*"` matches every action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationRule {
    pub action: String,
    pub floor: RiskTier,
}

impl EscalationRule {
    pub fn new(action: impl Into<String>, floor: RiskTier) -> Self {
        Self {
            action: action.into(),
            floor,
        }
    }

    pub fn matches(&self, action_type: &str) -> bool {
        match self.action.strip_suffix('*') {
            Some(prefix) => action_type.starts_with(prefix),
            None => self.action == action_type,
        }
    }
}

/// The built-in escalation floors. They apply on top of any configured rules
/// unless `[classifier] builtin_escalations = false`.
pub fn default_escalations() -> Vec<EscalationRule> {
    vec![
        EscalationRule::new("payment:*", RiskTier::High),
        EscalationRule::new("user:delete", RiskTier::High),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Apply `default_escalations()` in addition to configured rules.
    pub builtin_escalations: bool,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            builtin_escalations: true,
        }
    }
}

/// The policy half of the runtime configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub registry: RegistrySettings,

    #[serde(default)]
    pub classifier: ClassifierSettings,

    #[serde(default)]
    pub agents: Vec<AgentManifest>,

    /// Rules added to the built-in floors.
    #[serde(default)]
    pub escalations: Vec<EscalationRule>,
}

impl PolicyConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `BastionError::ConfigError` if the TOML is malformed, does not
    /// match the expected schema, or declares an empty agent id or action type.
    pub fn from_toml_str(s: &str) -> BastionResult<Self> {
        let config: PolicyConfig = toml::from_str(s).map_err(|e| BastionError::ConfigError {
            reason: format!("failed to parse policy TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> BastionResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| BastionError::ConfigError {
            reason: format!("failed to read policy file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The escalation rules in force: the built-in floors (unless disabled)
    /// followed by the configured rules.
    pub fn escalation_rules(&self) -> Vec<EscalationRule> {
        let mut rules = if self.classifier.builtin_escalations {
            default_escalations()
        } else {
            Vec::new()
        };
        rules.extend(self.escalations.iter().cloned());
        rules
    }

    fn validate(&self) -> BastionResult<()> {
        for agent in &self.agents {
            if agent.agent_id.as_str().is_empty() {
                return Err(BastionError::ConfigError {
                    reason: "agent_id must not be empty".to_string(),
                });
            }
            if let Some(cap) = agent.capabilities.iter().find(|c| c.action_type.is_empty()) {
                return Err(BastionError::ConfigError {
                    reason: format!(
                        "agent '{}' declares a capability with an empty action type{}",
                        agent.agent_id,
                        cap.resource
                            .as_ref()
                            .map(|p| format!(" (resource '{}')", p))
                            .unwrap_or_default()
                    ),
                });
            }
        }
        if self.escalations.iter().any(|r| r.action.is_empty()) {
            return Err(BastionError::ConfigError {
                reason: "escalation action pattern must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
