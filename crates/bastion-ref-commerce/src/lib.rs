//! # bastion-ref-commerce
//!
//! Commerce reference pack for the BASTION capability-based access control
//! runtime.
//!
//! A customer-support agent declares four capabilities (`api:call`,
//! `database:read`, `notification:send`, `payment:process`) and exposes six
//! business actions across three risk tiers. The scenarios drive it through:
//!
//! 1. **Business actions** — every action once, each one authorized, audited
//!    and credited to the agent's trust score.
//! 2. **Bulk run** — a seeded random sequence of actions.
//! 3. **CBAC demo** — four prompt-injection style requests for capabilities
//!    the agent never declared, each blocked with a security alert.
//! 4. **Report** — trust, activity, alerts and audit chain integrity per agent.
//!
//! All data is fictional. No external systems are contacted.

use thiserror::Error;

pub mod actions;
pub mod mock_data;
pub mod runtime;
pub mod scenarios;

pub use actions::{ActionKind, CommerceAgent};
pub use runtime::{CommerceRuntime, DEMO_AGENT, DEMO_CONFIG};

/// Failures raised by the mock business operations themselves.
#[derive(Debug, Error)]
pub enum CommerceError {
    #[error("refund of {amount} for order '{order_id}' rejected: amount must be positive")]
    InvalidAmount { order_id: String, amount: f64 },
}

// ── Tests ─────────────────────────────────────────────────────────────────────
