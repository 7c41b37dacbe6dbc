//! Commerce reference runtime demo scenarios.
//!
//! Each scenario drives a shared `CommerceRuntime` and prints what the
//! interceptor decided. Denials are expected outcomes and are reported, not
//! returned; only infrastructure failures abort a scenario.

pub mod bulk;
pub mod business_actions;
pub mod cbac;
pub mod report;

use serde_json::Value;

use bastion_contracts::error::{BastionError, BastionResult};

/// How one intercepted call ended, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Done,
    Blocked,
    Failed,
}

/// Split expected outcomes (success, denial, action failure) from errors that
/// should stop the scenario.
pub(crate) fn settle(result: BastionResult<Value>) -> BastionResult<(CallStatus, Option<Value>)> {
    match result {
        Ok(value) => Ok((CallStatus::Done, Some(value))),
        Err(e) if e.is_denial() => {
            println!("  BLOCKED: {}", e);
            Ok((CallStatus::Blocked, None))
        }
        Err(e @ BastionError::ExecutionFailure { .. }) => {
            println!("  FAILED: {}", e);
            Ok((CallStatus::Failed, None))
        }
        Err(e) => Err(e),
    }
}
