//! Action requests and declared action metadata.
//!
//! `ActionRequest` is what reaches the interceptor. `ActionSpec` is the
//! metadata a business action declares once, up front, so that every later
//! invocation can be turned into a request without the caller restating its
//! action type or risk level.

use serde::{Deserialize, Serialize};

use crate::{agent::AgentId, decision::RiskTier};

/// One attempted action, as seen at the enforcement boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// The agent attempting the action.
    pub agent_id: AgentId,
    /// Namespaced action type, e.g. `"database:read"`.
    pub action_type: String,
    /// The resource the action targets, e.g. `"users/123"`.
    pub resource: String,
    /// Risk level declared by the action itself.
    pub risk_level: RiskTier,
    /// Open key/value bag carried into the audit trail.
    ///
    /// Never consulted for authorization: two requests that differ only in
    /// context always receive the same verdict.
    pub context: serde_json::Value,
}

impl ActionRequest {
    /// A low-risk request with an empty context.
    pub fn new(
        agent_id: AgentId,
        action_type: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            agent_id,
            action_type: action_type.into(),
            resource: resource.into(),
            risk_level: RiskTier::Low,
            context: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_risk_level(mut self, risk_level: RiskTier) -> Self {
        self.risk_level = risk_level;
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }
}

/// Metadata a business action declares before it is ever called.
///
/// Registered with an action catalog under `name`; tracked invocations look
/// the `ActionSpec` up and build the `ActionRequest` from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    /// Catalog key, e.g. `"check_weather"`.
    pub name: String,
    /// The action type checked against the agent's capabilities.
    pub action_type: String,
    /// Resource used when an invocation does not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// The declared risk level; the classifier may escalate it.
    #[serde(default)]
    pub risk_level: RiskTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ActionSpec {
    pub fn new(name: impl Into<String>, action_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action_type: action_type.into(),
            resource: None,
            risk_level: RiskTier::Low,
            description: None,
        }
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn risk_level(mut self, risk_level: RiskTier) -> Self {
        self.risk_level = risk_level;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The resource an invocation targets when it does not supply one.
    ///
    /// Falls back to the action name so that every request has a non-empty
    /// resource for the audit trail.
    pub fn default_resource(&self) -> &str {
        self.resource.as_deref().unwrap_or(&self.name)
    }

    /// Build a request for `agent_id` against `resource`.
    pub fn to_request(
        &self,
        agent_id: AgentId,
        resource: impl Into<String>,
        context: serde_json::Value,
    ) -> ActionRequest {
        ActionRequest {
            agent_id,
            action_type: self.action_type.clone(),
            resource: resource.into(),
            risk_level: self.risk_level,
            context,
        }
    }
}
