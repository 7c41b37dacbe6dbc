//! Scenario 4: Runtime Report
//!
//! Summarizes what the runtime has seen so far: each registered agent's trust
//! score and recent changes, its audit records by verdict and kind, its
//! security alerts with their triage status, and the terminal hash of its
//! exported chain. Alert totals by severity and status close the report.

use bastion_audit::verify_chain;
use bastion_contracts::{
    audit::{AlertMetrics, AlertSeverity, AuditFilter, RecordKind, SecurityAlert},
    decision::Verdict,
    error::BastionResult,
};
use bastion_core::traits::TrustLedger;

use crate::runtime::CommerceRuntime;

/// Most recent trust changes printed per agent.
const HISTORY_TAIL: usize = 5;

pub fn run_scenario(runtime: &CommerceRuntime) -> BastionResult<()> {
    println!("=== Scenario 4: Runtime Report ===");
    println!();

    for agent_id in runtime.registry().agents()? {
        let trust = runtime.trust().snapshot(&agent_id)?;
        let log = runtime.audit().export_log(&agent_id)?;

        let count = |verdict: Verdict, kind: RecordKind| {
            log.records
                .iter()
                .filter(|r| r.verdict() == verdict && r.kind == kind)
                .count()
        };

        println!("  Agent: {}", agent_id);
        println!(
            "    Trust score:        {:.1} ({} successes, {} violations)",
            trust.score, trust.success_count, trust.violation_count
        );
        if let Some(last_active) = trust.last_active {
            println!("    Last active:        {}", last_active.to_rfc3339());
        }
        println!(
            "    Actions:            {} allowed, {} denied",
            count(Verdict::Allowed, RecordKind::Action),
            count(Verdict::Denied, RecordKind::Action)
        );
        println!(
            "    Inquiries:          {} allowed, {} denied",
            count(Verdict::Allowed, RecordKind::Inquiry),
            count(Verdict::Denied, RecordKind::Inquiry)
        );

        let history = runtime.trust().history(&agent_id)?;
        let skip = history.len().saturating_sub(HISTORY_TAIL);
        for change in &history[skip..] {
            println!(
                "    Trust change:       {:.1} -> {:.1} ({})",
                change.previous, change.current, change.reason
            );
        }

        print_alerts(&log.alerts);

        println!(
            "    Audit chain:        {} record(s), {}",
            log.records.len(),
            if verify_chain(&log.records) { "VALID" } else { "BROKEN" }
        );
        if !log.terminal_hash.is_empty() {
            println!("    Terminal hash:      {}", log.terminal_hash);
        }
        println!();
    }

    let intact = runtime.audit().verify_integrity();
    println!(
        "  Audit log: {} record(s) across {} agent(s), integrity {}",
        runtime.audit().len()?,
        runtime.audit().agents()?.len(),
        if intact { "VERIFIED" } else { "FAILED" }
    );
    print_metrics(&runtime.audit().alert_metrics(&AuditFilter::default())?);
    println!("  Scenario 4 complete.");
    println!();

    Ok(())
}

fn print_alerts(alerts: &[SecurityAlert]) {
    if alerts.is_empty() {
        println!("    Security alerts:    none");
        return;
    }
    println!("    Security alerts:    {}", alerts.len());
    for alert in alerts {
        println!(
            "      [{}] record {}: {} on {} ({})",
            alert.severity, alert.record_id, alert.action_type, alert.resource, alert.status
        );
    }
}

fn print_metrics(metrics: &AlertMetrics) {
    println!(
        "  Alerts: {} total, {} open, {} acknowledged, {} resolved, {} false positive",
        metrics.total, metrics.open, metrics.acknowledged, metrics.resolved, metrics.false_positive
    );
    if metrics.total > 0 {
        println!(
            "  Alert severity: {} critical, {} high, {} warning",
            metrics.severity(AlertSeverity::Critical),
            metrics.severity(AlertSeverity::High),
            metrics.severity(AlertSeverity::Warning)
        );
    }
}
