//! Verification endpoint response type.
//!
//! A verification is the authorization phase of the interceptor run on its
//! own: the caller learns what `intercept` would decide without executing
//! anything.

use serde::{Deserialize, Serialize};

use crate::{
    audit::AuditRecordId,
    decision::{AuthorizationDecision, RiskTier, Verdict},
};

/// The answer to a verification pre-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResponse {
    /// True only when the verdict is `allowed`.
    pub verified: bool,
    pub status: Verdict,
    /// Present on denial.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub risk_tier: RiskTier,
    /// The inquiry record written for this check, when inquiries are audited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<AuditRecordId>,
}

impl VerificationResponse {
    pub fn from_decision(decision: &AuthorizationDecision, record_id: Option<AuditRecordId>) -> Self {
        let verified = decision.is_allowed();
        Self {
            verified,
            status: decision.verdict,
            reason: if verified { None } else { Some(decision.reason.clone()) },
            risk_tier: decision.risk_tier,
            record_id,
        }
    }
}
