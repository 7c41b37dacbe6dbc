//! Scenario 2: Bulk Run
//!
//! Picks `count` actions at random, with random arguments, and runs them all
//! for one agent. The generator is seeded, so the same seed always replays the
//! same sequence.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use bastion_contracts::error::BastionResult;

use crate::actions::ActionKind;
use crate::runtime::CommerceRuntime;
use crate::scenarios::business_actions::{call, ActionArgs};
use crate::scenarios::{settle, CallStatus};

const CITIES: [&str; 5] = ["NYC", "LA", "Chicago", "Miami", "Seattle"];
const QUERIES: [&str; 5] = ["laptop", "phone", "tablet", "watch", "camera"];

/// Tally of a bulk run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkSummary {
    pub succeeded: usize,
    pub blocked: usize,
    pub failed: usize,
}

impl BulkSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.blocked + self.failed
    }
}

fn random_args(rng: &mut StdRng) -> ActionArgs {
    ActionArgs {
        city: CITIES.choose(rng).copied().unwrap_or("NYC").to_string(),
        query: QUERIES.choose(rng).copied().unwrap_or("laptop").to_string(),
        user_id: format!("user_{}", rng.gen_range(100..=999)),
        message: "Test message".to_string(),
        order_id: format!("ORD-{}", rng.gen_range(1000..=9999)),
        amount: f64::from(rng.gen_range(1_000u32..=20_000)) / 100.0,
    }
}

pub fn run_scenario(
    runtime: &CommerceRuntime,
    agent_id: &str,
    count: usize,
    seed: u64,
) -> BastionResult<BulkSummary> {
    println!("=== Scenario 2: Bulk Run ===");
    println!();
    println!("  Agent: {}  Actions: {}  Seed: {}", agent_id, count, seed);
    println!();

    let agent = runtime.agent(agent_id)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut summary = BulkSummary::default();

    for i in 0..count {
        let kind = ActionKind::ALL[rng.gen_range(0..ActionKind::ALL.len())];
        let args = random_args(&mut rng);

        println!("  Action {}/{}: {}", i + 1, count, kind);
        let (status, _) = settle(call(&agent, kind, &args))?;
        match status {
            CallStatus::Done => summary.succeeded += 1,
            CallStatus::Blocked => summary.blocked += 1,
            CallStatus::Failed => summary.failed += 1,
        }
    }

    println!();
    println!(
        "  Succeeded: {}  Blocked: {}  Failed: {}",
        summary.succeeded, summary.blocked, summary.failed
    );
    println!("  Trust score: {:.1}", agent.trust()?.score);
    println!("  Scenario 2 complete.");
    println!();

    Ok(summary)
}
