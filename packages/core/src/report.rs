//! Plain-text rendering of an [`EstimateReport`] for the CLI.

use std::fmt::Write;

use crate::estimator::{CongestionMode, EstimateReport};

const WEI_PER_GWEI: f64 = 1e9;
const WEI_PER_ETH: f64 = 1e18;

fn gwei(wei: u128) -> String {
    format!("{:.4}", wei as f64 / WEI_PER_GWEI)
}

/// Worst-case cost of a transaction using `gas_limit` gas, in ETH.
fn max_cost_eth(max_fee_per_gas: u128, gas_limit: u64) -> String {
    let wei = max_fee_per_gas.saturating_mul(gas_limit as u128);
    format!("{:.6}", wei as f64 / WEI_PER_ETH)
}

/// Render the summary header, the per-tier table and the selected tier's
/// raw wei values.
pub fn render_report(report: &EstimateReport, gas_limit: u64) -> String {
    let mut out = String::new();
    let rule = "=".repeat(84);

    let mode = match report.congestion.mode {
        CongestionMode::Discount => "discount",
        CongestionMode::Neutral => "neutral",
        CongestionMode::Surge => "surge",
    };

    let _ = writeln!(
        out,
        "Congestion (avg gas used): {:.1}% ({}, x{:.2} tips)",
        report.congestion.moving_average_ratio * 100.0,
        mode,
        report.congestion.multiplier
    );
    let _ = writeln!(
        out,
        "Base fee (next block):     {} gwei, trend {:?}",
        gwei(report.anchor_base_fee),
        report.base_fee_trend
    );
    if let Some(block) = report.latest_block {
        let _ = writeln!(out, "Latest sampled block:      {}", block);
    }
    if report.panic_adjusted {
        if report.requested_tier == report.selected_tier {
            let _ = writeln!(
                out,
                "PANIC: base fee spiked for {} consecutive blocks; {} already at panic floor",
                report.panic.longest_run, report.selected_tier
            );
        } else {
            let _ = writeln!(
                out,
                "PANIC: base fee spiked for {} consecutive blocks; {} raised to {}",
                report.panic.longest_run, report.requested_tier, report.selected_tier
            );
        }
    }

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "  {:<12} | {:<12} | {:>16} | {:>16} | {:>16}",
        "TIER", "CONFIDENCE", "MAX FEE (gwei)", "PRIORITY (gwei)", "MAX COST (ETH)"
    );
    let _ = writeln!(out, "{}", "-".repeat(84));
    for estimate in &report.estimates {
        let marker = if estimate.tier_name == report.selected_tier { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{} {:<12} | {:<12} | {:>16} | {:>16} | {:>16}",
            marker,
            estimate.tier_name,
            estimate.confidence_label,
            gwei(estimate.max_fee_per_gas),
            gwei(estimate.max_priority_fee_per_gas),
            max_cost_eth(estimate.max_fee_per_gas, gas_limit)
        );
    }
    let _ = writeln!(out, "{}", rule);

    for warning in &report.warnings {
        let _ = writeln!(
            out,
            "warning: {:?} of {} ({}) is below {} ({})",
            warning.field,
            warning.upper_tier,
            warning.upper_value,
            warning.lower_tier,
            warning.lower_value
        );
    }

    if let Some(selected) = report.selected() {
        let _ = writeln!(out, "maxPriorityFeePerGas: {}", selected.max_priority_fee_per_gas);
        let _ = writeln!(out, "maxFeePerGas:         {}", selected.max_fee_per_gas);
    }

    out
}
