//! # bastion-trust
//!
//! Bounded per-agent trust scoring for the BASTION runtime.
//!
//! Every agent carries a score in `[0, 100]`. Capability violations subtract
//! a tier-scaled penalty, successful actions add a tier-scaled reward, and
//! every change is kept in a per-agent history. Trust is a signal for
//! dashboards and operators; it never gates an action.
//!
//! ```rust,ignore
//! use bastion_trust::{TrustEngine, TrustPolicy};
//!
//! let engine = TrustEngine::new(TrustPolicy::from_file(path)?)?;
//! // Pass `engine` to `bastion_core::Interceptor::new(...)`.
//! ```

pub mod engine;
pub mod policy;

pub use engine::TrustEngine;
pub use policy::{TierAmounts, TrustPolicy};

// ── Tests ─────────────────────────────────────────────────────────────────────
