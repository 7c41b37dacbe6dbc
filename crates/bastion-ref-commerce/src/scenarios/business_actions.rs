//! Scenario 1: Business Actions
//!
//! Runs each of the six business actions once for a single agent. With the
//! demo manifest every call is authorized, so each one produces an `allowed`
//! audit record with a `succeeded` outcome and a tier-sized trust reward.

use serde_json::Value;

use bastion_contracts::error::BastionResult;

use crate::actions::{ActionKind, CommerceAgent};
use crate::runtime::CommerceRuntime;
use crate::scenarios::{settle, CallStatus};

/// Arguments for the business actions. Each action reads only its own fields.
#[derive(Debug, Clone)]
pub struct ActionArgs {
    pub city: String,
    pub query: String,
    pub user_id: String,
    pub message: String,
    pub order_id: String,
    pub amount: f64,
}

impl ActionArgs {
    /// The arguments used by the full walk-through.
    pub fn walkthrough() -> Self {
        Self {
            city: "New York".to_string(),
            query: "headphones".to_string(),
            user_id: "user_456".to_string(),
            message: "Your order shipped!".to_string(),
            order_id: "ORD-789".to_string(),
            amount: 29.99,
        }
    }
}

/// Dispatch one action with its arguments.
pub fn call(agent: &CommerceAgent, kind: ActionKind, args: &ActionArgs) -> BastionResult<Value> {
    match kind {
        ActionKind::CheckWeather => agent.check_weather(&args.city),
        ActionKind::SearchProducts => agent.search_products(&args.query),
        ActionKind::GetUserProfile => agent.get_user_profile(&args.user_id),
        ActionKind::QueryOrders => agent.query_orders(&args.user_id),
        ActionKind::SendNotification => agent.send_notification(&args.user_id, &args.message),
        ActionKind::ProcessRefund => agent.process_refund(&args.order_id, args.amount),
    }
}

/// Run a single action and print its result.
pub fn run_action(
    runtime: &CommerceRuntime,
    agent_id: &str,
    kind: ActionKind,
    args: &ActionArgs,
) -> BastionResult<CallStatus> {
    let agent = runtime.agent(agent_id)?;

    println!("  {} ({}, declared {})", kind.label(), kind.action_type(), kind.declared_risk());
    let (status, value) = settle(call(&agent, kind, args))?;
    if let Some(value) = value {
        println!("  Result: {}", value);
    }
    println!("  Trust score: {:.1}", agent.trust()?.score);
    println!();

    Ok(status)
}

pub fn run_scenario(runtime: &CommerceRuntime, agent_id: &str) -> BastionResult<Vec<CallStatus>> {
    println!("=== Scenario 1: Business Actions ===");
    println!();
    println!("  Agent: {}", agent_id);
    println!();

    let args = ActionArgs::walkthrough();
    let mut statuses = Vec::with_capacity(ActionKind::ALL.len());
    for (i, kind) in ActionKind::ALL.into_iter().enumerate() {
        println!("  [{}/{}]", i + 1, ActionKind::ALL.len());
        statuses.push(run_action(runtime, agent_id, kind, &args)?);
    }

    let done = statuses.iter().filter(|s| **s == CallStatus::Done).count();
    println!("  Scenario 1 complete: {}/{} actions succeeded.", done, statuses.len());
    println!();

    Ok(statuses)
}
