//! Risk tiers, verdicts, and the authorization decision record.
//!
//! The interceptor produces exactly one `AuthorizationDecision` per action
//! request. It is the only artifact the audit logger and trust engine consume,
//! and it is never modified after creation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::ActionRequest;
use crate::error::BastionError;

/// Reason attached to a denial when no capability covers the request.
pub const REASON_CAPABILITY_NOT_GRANTED: &str = "capability_not_granted";

/// Reason attached to an approval.
pub const REASON_CAPABILITY_GRANTED: &str = "capability_granted";

/// Coarse risk classification driving monitoring intensity and trust impact.
///
/// Ordered: `Low < Medium < High`. Escalation rules raise a tier using `max`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTier {
    type Err = BastionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(RiskTier::Low),
            "medium" => Ok(RiskTier::Medium),
            "high" => Ok(RiskTier::High),
            other => Err(BastionError::ConfigError {
                reason: format!("unknown risk level '{other}' (expected low, medium, or high)"),
            }),
        }
    }
}

/// The outcome of the capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Allowed,
    Denied,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Allowed => "allowed",
            Verdict::Denied => "denied",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique identifier for a single authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionId(pub uuid::Uuid);

impl DecisionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for DecisionId {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable record of one authorization decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationDecision {
    pub decision_id: DecisionId,
    /// The request exactly as the interceptor received it.
    pub request: ActionRequest,
    pub verdict: Verdict,
    /// Machine-readable reason, e.g. `"capability_not_granted"`.
    pub reason: String,
    /// Tier after classification (declared level plus any escalation).
    pub risk_tier: RiskTier,
    /// Wall-clock time the decision was made (UTC).
    pub timestamp: DateTime<Utc>,
}

impl AuthorizationDecision {
    /// Build an `allowed` decision stamped with the current time.
    pub fn allowed(request: ActionRequest, risk_tier: RiskTier) -> Self {
        Self {
            decision_id: DecisionId::new(),
            request,
            verdict: Verdict::Allowed,
            reason: REASON_CAPABILITY_GRANTED.to_string(),
            risk_tier,
            timestamp: Utc::now(),
        }
    }

    /// Build a `denied` decision with reason `capability_not_granted`.
    pub fn denied(request: ActionRequest, risk_tier: RiskTier) -> Self {
        Self {
            decision_id: DecisionId::new(),
            request,
            verdict: Verdict::Denied,
            reason: REASON_CAPABILITY_NOT_GRANTED.to_string(),
            risk_tier,
            timestamp: Utc::now(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.verdict == Verdict::Allowed
    }
}
