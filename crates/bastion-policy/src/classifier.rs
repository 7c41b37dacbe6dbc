//! Rule-based risk classifier.
//!
//! The declared risk level of an action is its base tier. Each escalation
//! rule whose action pattern matches raises the tier to at least the rule's
//! floor. Rules never lower a tier, so the result is the maximum of the
//! declared level and every matching floor.

use std::path::Path;

use tracing::debug;

use bastion_contracts::{decision::RiskTier, error::BastionResult};
use bastion_core::traits::RiskClassifier;

use crate::manifest::{default_escalations, EscalationRule, PolicyConfig};

#[derive(Debug, Clone)]
pub struct RuleClassifier {
    rules: Vec<EscalationRule>,
}

impl RuleClassifier {
    pub fn new(rules: Vec<EscalationRule>) -> Self {
        Self { rules }
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(config.escalation_rules())
    }

    pub fn from_toml_str(s: &str) -> BastionResult<Self> {
        Ok(Self::from_config(&PolicyConfig::from_toml_str(s)?))
    }

    pub fn from_file(path: &Path) -> BastionResult<Self> {
        Ok(Self::from_config(&PolicyConfig::from_file(path)?))
    }

    pub fn rules(&self) -> &[EscalationRule] {
        &self.rules
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new(default_escalations())
    }
}

impl RiskClassifier for RuleClassifier {
    fn classify(&self, action_type: &str, declared: RiskTier) -> RiskTier {
        let tier = self
            .rules
            .iter()
            .filter(|rule| rule.matches(action_type))
            .map(|rule| rule.floor)
            .fold(declared, RiskTier::max);

        if tier != declared {
            debug!(
                action_type = %action_type,
                declared = %declared,
                tier = %tier,
                "risk tier escalated"
            );
        }
        tier
    }
}
