//! Interceptor configuration.
//!
//! Read from the `[audit]` table of the runtime's TOML document. Other tables
//! in the same document belong to other crates and are ignored here.
//!
//! ```toml
//! [audit]
//! attempts = 3          # total tries for a transiently failing audit write
//! inquiries = "record"  # or "silent"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use bastion_contracts::error::{BastionError, BastionResult};

/// Whether verification pre-checks leave a trace in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InquiryAudit {
    /// Write an `inquiry` record for every check, plus an alert when denied.
    #[default]
    Record,
    /// Answer the check without touching the audit log.
    Silent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptorConfig {
    /// Total attempts for an audit write that fails transiently. Minimum 1.
    pub attempts: u32,
    pub inquiries: InquiryAudit,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            inquiries: InquiryAudit::Record,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    audit: InterceptorConfig,
}

impl InterceptorConfig {
    /// Parse the `[audit]` table out of a TOML document. A document without
    /// one yields the defaults.
    pub fn from_toml_str(s: &str) -> BastionResult<Self> {
        let doc: ConfigDocument = toml::from_str(s).map_err(|e| BastionError::ConfigError {
            reason: format!("failed to parse audit configuration: {}", e),
        })?;
        if doc.audit.attempts == 0 {
            return Err(BastionError::ConfigError {
                reason: "audit.attempts must be at least 1".to_string(),
            });
        }
        Ok(doc.audit)
    }

    pub fn from_file(path: &Path) -> BastionResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| BastionError::ConfigError {
            reason: format!("failed to read configuration file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}
