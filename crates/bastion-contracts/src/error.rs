//! Runtime error types for the BASTION access-control runtime.
//!
//! All fallible operations return `BastionResult<T>`. `AuthorizationDenied`
//! is an expected business outcome and is kept distinct from infrastructure
//! failures such as `AuditWriteFailed` so callers can tell them apart.

use thiserror::Error;

/// The unified error type for the BASTION runtime.
#[derive(Debug, Error)]
pub enum BastionError {
    /// The request names an agent that was never registered (or was removed).
    #[error("unknown agent '{agent_id}'")]
    UnknownAgent { agent_id: String },

    /// No capability held by the agent covers the requested action.
    ///
    /// By the time a caller sees this, the audit record and security alert
    /// for the attempt have already been written.
    #[error("agent '{agent_id}' is not authorized for '{action_type}' on '{resource}': {reason} (audit record {record_id})")]
    AuthorizationDenied {
        agent_id: String,
        action_type: String,
        resource: String,
        reason: String,
        record_id: u64,
    },

    /// The agent is already registered and the registry rejects replacement.
    #[error("agent '{agent_id}' is already registered")]
    AlreadyRegistered { agent_id: String },

    /// The wrapped action ran and failed. `source` is the action's own error.
    #[error("action '{action_type}' failed: {source}")]
    ExecutionFailure {
        action_type: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The audit log could not persist a record.
    ///
    /// `transient` failures may be retried; anything else is fatal to the
    /// request, since an action that cannot be audited must not proceed.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String, transient: bool },

    /// An outcome update referenced a record id the log does not contain.
    #[error("audit record {record_id} not found")]
    AuditRecordNotFound { record_id: u64 },

    /// An outcome was already attached to this record.
    #[error("audit record {record_id} already has an outcome")]
    OutcomeAlreadyRecorded { record_id: u64 },

    /// No security alert with this id exists.
    #[error("security alert {alert_id} not found")]
    AlertNotFound { alert_id: String },

    /// Alert status only moves forward; closed alerts stay closed.
    #[error("security alert {alert_id} cannot move from {from} to {to}")]
    InvalidAlertTransition {
        alert_id: String,
        from: String,
        to: String,
    },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

impl BastionError {
    /// True for the expected, non-infrastructure denial outcome.
    pub fn is_denial(&self) -> bool {
        matches!(self, BastionError::AuthorizationDenied { .. })
    }

    /// True for audit failures that a bounded retry may clear.
    pub fn is_transient(&self) -> bool {
        matches!(self, BastionError::AuditWriteFailed { transient: true, .. })
    }
}

/// Convenience alias used throughout the BASTION crates.
pub type BastionResult<T> = Result<T, BastionError>;
