//! BASTION Commerce Reference Runtime — Demo CLI
//!
//! Drives a customer-support agent through the commerce scenarios. Every
//! action goes through the real BASTION interceptor: capability registry,
//! risk classifier, hash-chained audit log and trust engine.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- bulk --count 25 --seed 7
//!   cargo run -p demo -- cbac
//!   cargo run -p demo -- report
//!   cargo run -p demo -- action process-refund --order-id ORD-42 --amount 12.50
//!   cargo run -p demo -- --agent reporting-agent action check-weather
//!   cargo run -p demo -- --config my-policy.toml run-all

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use bastion_contracts::error::BastionResult;
use bastion_ref_commerce::scenarios::{bulk, business_actions, cbac, report};
use bastion_ref_commerce::{ActionKind, CommerceRuntime, DEMO_AGENT};

// ── CLI definition ────────────────────────────────────────────────────────────

/// BASTION — capability-based access control for AI agents.
///
/// Each subcommand runs one commerce scenario against a runtime built from the
/// built-in configuration, or from `--config` when given.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "BASTION commerce reference runtime demo",
    long_about = "Runs BASTION commerce demo scenarios showing default-deny capability\n\
                  enforcement, security alerts, trust scoring, and audit chain integrity."
)]
struct Cli {
    /// Runtime configuration (TOML). Defaults to the built-in demo policy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Agent to drive.
    #[arg(long, global = true, default_value = DEMO_AGENT)]
    agent: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every business action once, then the CBAC demo and the report.
    RunAll,
    /// Run a seeded random sequence of actions.
    Bulk {
        #[arg(long, default_value_t = 10)]
        count: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Show prompt-injection attempts being blocked by capability checks.
    Cbac,
    /// Run a single business action.
    Action {
        kind: ActionArg,
        #[arg(long, default_value = "San Francisco")]
        city: String,
        #[arg(long, default_value = "laptop")]
        query: String,
        #[arg(long, default_value = "123")]
        user_id: String,
        #[arg(long, default_value = "Hello!")]
        message: String,
        #[arg(long, default_value = "ORD-001")]
        order_id: String,
        #[arg(long, default_value_t = 50.0)]
        amount: f64,
    },
    /// Print trust, audit and alert state for every registered agent.
    Report,
}

#[derive(Clone, Copy, ValueEnum)]
enum ActionArg {
    CheckWeather,
    SearchProducts,
    GetUserProfile,
    QueryOrders,
    SendNotification,
    ProcessRefund,
}

impl From<ActionArg> for ActionKind {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::CheckWeather => ActionKind::CheckWeather,
            ActionArg::SearchProducts => ActionKind::SearchProducts,
            ActionArg::GetUserProfile => ActionKind::GetUserProfile,
            ActionArg::QueryOrders => ActionKind::QueryOrders,
            ActionArg::SendNotification => ActionKind::SendNotification,
            ActionArg::ProcessRefund => ActionKind::ProcessRefund,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    match run(cli) {
        Ok(()) => {
            println!("All selected scenarios completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

fn run(cli: Cli) -> BastionResult<()> {
    let runtime = match &cli.config {
        Some(path) => {
            info!(path = %path.display(), "loading runtime configuration");
            CommerceRuntime::from_file(path)?
        }
        None => CommerceRuntime::demo()?,
    };
    let agent = cli.agent.as_str();

    match cli.command {
        Command::RunAll => {
            business_actions::run_scenario(&runtime, agent)?;
            cbac::run_scenario(&runtime, agent)?;
            report::run_scenario(&runtime)
        }
        Command::Bulk { count, seed } => {
            bulk::run_scenario(&runtime, agent, count, seed)?;
            report::run_scenario(&runtime)
        }
        Command::Cbac => {
            cbac::run_scenario(&runtime, agent)?;
            Ok(())
        }
        Command::Action {
            kind,
            city,
            query,
            user_id,
            message,
            order_id,
            amount,
        } => {
            let args = business_actions::ActionArgs {
                city,
                query,
                user_id,
                message,
                order_id,
                amount,
            };
            business_actions::run_action(&runtime, agent, kind.into(), &args)?;
            Ok(())
        }
        Command::Report => report::run_scenario(&runtime),
    }
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("BASTION — Capability-Based Access Control Runtime");
    println!("Commerce Reference Demo");
    println!("=================================================");
    println!();
    println!("BASTION enforcement pipeline per action:");
    println!("  [1] Registry checks the agent's declared capabilities → Allowed / Denied");
    println!("  [2] Classifier sets the risk tier (declared level, raised by escalation rules)");
    println!("  [3] Decision written to the agent's SHA-256 audit chain (denials raise an alert)");
    println!("  [4] Action executes — ONLY after steps 1-3 complete with Allowed");
    println!("  [5] Outcome attached to the record; trust score rewarded or penalized by tier");
    println!();
}
