//! Trust scoring policy.
//!
//! Read from the `[trust]` table of the runtime's TOML document. A field left
//! out keeps its default; a `penalties` or `rewards` table that is present
//! must list all three tiers.
//!
//! ```toml
//! [trust]
//! initial = 50.0
//! history_limit = 1000
//!
//! [trust.penalties]
//! low = 5.0
//! medium = 10.0
//! high = 20.0
//!
//! [trust.rewards]
//! low = 0.5
//! medium = 1.0
//! high = 2.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use bastion_contracts::{
    decision::RiskTier,
    error::{BastionError, BastionResult},
    trust::{TRUST_MAX, TRUST_MIN},
};

/// One amount per risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierAmounts {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl TierAmounts {
    pub fn for_tier(&self, tier: RiskTier) -> f64 {
        match tier {
            RiskTier::Low => self.low,
            RiskTier::Medium => self.medium,
            RiskTier::High => self.high,
        }
    }

    fn validate(&self, table: &str) -> BastionResult<()> {
        for (tier, amount) in [("low", self.low), ("medium", self.medium), ("high", self.high)] {
            if !amount.is_finite() || amount < 0.0 {
                return Err(BastionError::ConfigError {
                    reason: format!(
                        "trust.{}.{} must be a non-negative number, got {}",
                        table, tier, amount
                    ),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustPolicy {
    /// Score a newly enrolled agent starts with.
    pub initial: f64,

    /// Subtracted on a capability violation, by the violation's tier.
    pub penalties: TierAmounts,

    /// Added on a successful action, by the action's tier.
    pub rewards: TierAmounts,

    /// Maximum history entries kept per agent; the oldest are dropped first.
    pub history_limit: usize,
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self {
            initial: 50.0,
            penalties: TierAmounts {
                low: 5.0,
                medium: 10.0,
                high: 20.0,
            },
            rewards: TierAmounts {
                low: 0.5,
                medium: 1.0,
                high: 2.0,
            },
            history_limit: 1000,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    trust: TrustPolicy,
}

impl TrustPolicy {
    /// Parse the `[trust]` table out of a TOML document. A document without
    /// one yields the defaults.
    pub fn from_toml_str(s: &str) -> BastionResult<Self> {
        let doc: ConfigDocument = toml::from_str(s).map_err(|e| BastionError::ConfigError {
            reason: format!("failed to parse trust policy TOML: {}", e),
        })?;
        doc.trust.validate()?;
        Ok(doc.trust)
    }

    pub fn from_file(path: &Path) -> BastionResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| BastionError::ConfigError {
            reason: format!("failed to read trust policy file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> BastionResult<()> {
        if !(TRUST_MIN..=TRUST_MAX).contains(&self.initial) {
            return Err(BastionError::ConfigError {
                reason: format!(
                    "trust.initial must be within [{}, {}], got {}",
                    TRUST_MIN, TRUST_MAX, self.initial
                ),
            });
        }
        self.penalties.validate("penalties")?;
        self.rewards.validate("rewards")
    }
}
