//! # bastion-core
//!
//! The default-deny enforcement runtime for BASTION agents.
//!
//! This crate provides:
//! - The four core traits (`CapabilityRegistry`, `RiskClassifier`,
//!   `AuditLogger`, `TrustLedger`)
//! - The `Interceptor` that wires them together in the correct trust order,
//!   including the verification endpoint
//! - `ActionCatalog`, `AgentSession`, and `TrackedAction` for declaring
//!   actions once and invoking them through the interceptor
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bastion_core::{Interceptor, traits::{CapabilityRegistry, RiskClassifier, AuditLogger, TrustLedger}};
//! ```

pub mod config;
pub mod interceptor;
pub mod session;
pub mod traits;

#[cfg(test)]
mod testing;

pub use config::{InquiryAudit, InterceptorConfig};
pub use interceptor::{ActionError, Interceptor};
pub use session::{ActionCatalog, AgentSession, TrackedAction};
