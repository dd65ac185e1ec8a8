//! Allowance Sentinel CLI
//!
//! Scores a scan document offline and prints the report.
//!
//! Usage:
//!   allowance_sentinel <scan.json>
//!   allowance_sentinel -            (read from stdin)
//!
//! The document is a scan input: `target_address`, `scan_type`,
//! `chains`, `risk_factors` and `approvals` (each with optional `value_usd`).

use allowance_sentinel::core::allowance::format_allowance_with;
use allowance_sentinel::{assemble_scan, score_approvals, EngineConfig, ScanInput};

use eyre::{eyre, Result, WrapErr};
use std::io::Read;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| eyre!("usage: allowance_sentinel <scan.json | ->"))?;

    let raw = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .wrap_err("reading scan from stdin")?;
        buf
    } else {
        std::fs::read_to_string(&path).wrap_err_with(|| format!("reading {}", path))?
    };

    let input: ScanInput = serde_json::from_str(&raw).wrap_err("parsing scan document")?;
    let config = EngineConfig::from_env()?;
    info!(path = %path, approvals = input.approvals.len(), factors = input.risk_factors.len(), "Loaded scan input");

    let risks = score_approvals(&config.approval, &input.approvals);

    println!("\nApprovals for {}:", input.target_address);
    for risk in &risks {
        let amount = format_allowance_with(
            &config.approval,
            risk.approval.allowance,
            risk.approval.decimals,
        )?;
        println!(
            "  [{:<6}] {:>14} {:<8} spender {} - {}",
            risk.risk_level.as_str().to_uppercase(),
            amount,
            risk.approval.symbol,
            risk.approval.spender,
            risk.reason
        );
    }

    let now = chrono::Utc::now();
    let scan = assemble_scan(&config, input, now);
    let stats = scan.meta.totals.approvals;
    let summary = scan.summary(&config, now);

    println!(
        "\n  Total: {}  Unlimited: {}  High: {}  Medium: {}  Low: {}",
        stats.total, stats.unlimited, stats.high, stats.medium, stats.low
    );
    println!(
        "\nTrust score: {} ({})  Status: {}  Factors: {}",
        summary.trust_score,
        summary.grade,
        summary.tone.as_str(),
        scan.risk_factors.len()
    );
    for factor in &scan.risk_factors {
        println!(
            "  - [{:?}] {}: {}",
            factor.severity, factor.category, factor.description
        );
    }
    println!("\nScan id: {}", scan.id);

    Ok(())
}
