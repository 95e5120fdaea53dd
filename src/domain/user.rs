//! Per-wallet derived view over the opportunity set.
//!
//! Given the signal a wallet already holds per deployment, compute the
//! wallet's own position metrics, and rebuild the opportunity set so the
//! optimizer models allocation *on top of* current holdings.

use std::collections::HashMap;

use super::earnings::{EarningsModel, PositionMetrics};
use super::error::DomainError;
use super::ids::DeploymentId;
use super::opportunity::Opportunity;

/// A wallet's current position in one deployment.
#[derive(Debug, Clone)]
pub struct UserOpportunity {
    id: DeploymentId,
    user_signal: f64,
    total_signal: f64,
    portion_owned: f64,
    estimated_earnings: f64,
    apr: f64,
    weekly_queries: u64,
}

impl UserOpportunity {
    /// Deployment identifier.
    pub fn id(&self) -> &DeploymentId {
        &self.id
    }

    /// Signal held by the wallet, in GRT.
    pub fn user_signal(&self) -> f64 {
        self.user_signal
    }

    /// Total signal in the pool, in GRT.
    pub fn total_signal(&self) -> f64 {
        self.total_signal
    }

    /// The wallet's fraction of the pool.
    pub fn portion_owned(&self) -> f64 {
        self.portion_owned
    }

    /// Estimated yearly USD earnings at the held amount.
    pub fn estimated_earnings(&self) -> f64 {
        self.estimated_earnings
    }

    /// APR at the held amount, in percent.
    pub fn apr(&self) -> f64 {
        self.apr
    }

    /// Raw observed weekly query count for the deployment.
    pub fn weekly_queries(&self) -> u64 {
        self.weekly_queries
    }
}

/// Compute a wallet's positions across the opportunity set.
///
/// Only deployments the wallet actually holds appear in the output; sorted
/// by APR descending.
///
/// # Errors
///
/// Returns `DomainError::NonPositivePrice` if `price <= 0`.
pub fn build_user_opportunities(
    user_signals: &HashMap<DeploymentId, f64>,
    opportunities: &[Opportunity],
    price: f64,
) -> Result<Vec<UserOpportunity>, DomainError> {
    let model = EarningsModel::try_new(price)?;

    let mut positions: Vec<UserOpportunity> = opportunities
        .iter()
        .filter_map(|opp| {
            let user_signal = *user_signals.get(opp.id())?;
            let total_signal = opp.signalled_tokens();
            let PositionMetrics {
                estimated_earnings,
                apr,
            } = model.position(user_signal, total_signal, opp.curator_share());

            Some(UserOpportunity {
                id: opp.id().clone(),
                user_signal,
                total_signal,
                portion_owned: EarningsModel::portion_owned(user_signal, total_signal),
                estimated_earnings,
                apr,
                weekly_queries: opp.weekly_queries(),
            })
        })
        .collect();

    positions.sort_by(|a, b| b.apr.partial_cmp(&a.apr).unwrap_or(std::cmp::Ordering::Equal));

    Ok(positions)
}

/// Rebuild the opportunity set for a wallet that already holds signal.
///
/// Held deployments get the wallet's stake subtracted from the pool and the
/// entry stake zeroed, so an optimizer run over the result models purely
/// additional allocation. Unheld deployments pass through unchanged. Output
/// keeps the APR-descending order of the input.
pub fn adjust_for_holdings(
    opportunities: &[Opportunity],
    user_signals: &HashMap<DeploymentId, f64>,
) -> Vec<Opportunity> {
    let mut adjusted: Vec<Opportunity> = opportunities
        .iter()
        .map(|opp| match user_signals.get(opp.id()) {
            Some(&held) => opp.without_holding(held),
            None => opp.clone(),
        })
        .collect();

    adjusted.sort_by(|a, b| b.apr().partial_cmp(&a.apr()).unwrap_or(std::cmp::Ordering::Equal));
    adjusted
}
