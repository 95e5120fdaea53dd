//! Terminal table rendering for opportunities and allocation plans.
//!
//! Thin presentation glue: consumes the immutable model and optimizer
//! outputs and prints tables. Display ordering is re-derived by sorting
//! here, never taken from map iteration order.

use owo_colors::OwoColorize;
use tabled::{Table, Tabled};

use crate::domain::{Opportunity, UserOpportunity};
use crate::optimizer::AllocationResult;

#[derive(Tabled)]
struct OpportunityRow {
    #[tabled(rename = "Deployment")]
    deployment: String,
    #[tabled(rename = "Signalled (GRT)")]
    signalled: String,
    #[tabled(rename = "Weekly Queries")]
    weekly_queries: String,
    #[tabled(rename = "Est. Earnings ($/yr)")]
    earnings: String,
    #[tabled(rename = "APR (%)")]
    apr: String,
}

#[derive(Tabled)]
struct PositionRow {
    #[tabled(rename = "Deployment")]
    deployment: String,
    #[tabled(rename = "Your Signal (GRT)")]
    user_signal: String,
    #[tabled(rename = "Pool Share (%)")]
    share: String,
    #[tabled(rename = "Est. Earnings ($/yr)")]
    earnings: String,
    #[tabled(rename = "APR (%)")]
    apr: String,
}

#[derive(Tabled)]
struct AllocationRow {
    #[tabled(rename = "Deployment")]
    deployment: String,
    #[tabled(rename = "Allocate (GRT)")]
    amount: String,
}

/// Shorten an IPFS hash for table display.
fn short_hash(hash: &str) -> String {
    if hash.len() > 14 {
        format!("{}…{}", &hash[..8], &hash[hash.len() - 4..])
    } else {
        hash.to_string()
    }
}

/// Print the top `limit` ranked opportunities.
pub fn print_opportunities(opportunities: &[Opportunity], limit: usize) {
    println!("{}", "Ranked opportunities".bold());

    let rows: Vec<OpportunityRow> = opportunities
        .iter()
        .take(limit)
        .map(|opp| OpportunityRow {
            deployment: short_hash(opp.id().as_str()),
            signalled: format!("{:.2}", opp.signalled_tokens()),
            weekly_queries: opp.weekly_queries().to_string(),
            earnings: format!("{:.2}", opp.estimated_earnings()),
            apr: format!("{:.2}", opp.apr()),
        })
        .collect();

    println!("{}", Table::new(rows));
}

/// Print a wallet's current positions.
pub fn print_positions(positions: &[UserOpportunity]) {
    println!("{}", "Current positions".bold());

    let rows: Vec<PositionRow> = positions
        .iter()
        .map(|pos| PositionRow {
            deployment: short_hash(pos.id().as_str()),
            user_signal: format!("{:.2}", pos.user_signal()),
            share: format!("{:.3}", pos.portion_owned() * 100.0),
            earnings: format!("{:.2}", pos.estimated_earnings()),
            apr: format!("{:.2}", pos.apr()),
        })
        .collect();

    println!("{}", Table::new(rows));
}

/// Print the allocation plan and portfolio summary.
pub fn print_allocation(result: &AllocationResult, budget: f64) {
    println!("{}", "Allocation plan".bold());

    let mut entries: Vec<(&str, f64)> = result
        .allocations
        .iter()
        .map(|(id, amount)| (id.as_str(), *amount))
        .collect();
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let rows: Vec<AllocationRow> = entries
        .iter()
        .map(|(id, amount)| AllocationRow {
            deployment: short_hash(id),
            amount: format!("{:.2}", amount),
        })
        .collect();

    println!("{}", Table::new(rows));

    let deployed = result.total_allocated;
    let unspent = budget - deployed;
    println!(
        "  total allocated: {} GRT ({} unspent)",
        format!("{deployed:.2}").green().bold(),
        format!("{unspent:.2}").dimmed(),
    );
    println!(
        "  expected APR: {}   expected earnings: {}/yr",
        format!("{:.2}%", result.expected_apr).green().bold(),
        format!("${:.2}", result.expected_earnings).green(),
    );
    if unspent > 0.01 {
        println!(
            "  {}",
            "budget not fully deployed: remaining opportunities are capped or unattractive"
                .yellow()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortens_long_hashes() {
        let hash = "QmWmyoMoctfbAaiEs2G46gpeUmhqFRDW6KWo64y5r581Vz";
        let short = short_hash(hash);
        assert!(short.len() < hash.len());
        assert!(short.starts_with("QmWmyoMo"));
    }

    #[test]
    fn keeps_short_hashes() {
        assert_eq!(short_hash("QmShort"), "QmShort");
    }
}
