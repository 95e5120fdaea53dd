//! Curation opportunity records and the model that builds them.
//!
//! `build_opportunities` turns raw on-chain deployment records and a
//! trailing-week query-count map into `Opportunity` snapshots ranked by APR.
//! The function is pure: identical inputs yield identical output, and the
//! records are never mutated after construction.

use std::collections::HashMap;

use super::earnings::{EarningsModel, PositionMetrics};
use super::error::DomainError;
use super::ids::DeploymentId;

/// Wei per GRT: raw on-chain amounts are fixed-point scaled by 10^18.
pub const WEI_PER_GRT: f64 = 1e18;

/// Weeks used to annualize a trailing 7-day query observation.
pub const WEEKS_PER_YEAR: u64 = 52;

/// Raw deployment record as decoded from the network subgraph.
///
/// Amounts are wei-scaled integers; the opportunity model divides by
/// [`WEI_PER_GRT`] to obtain real-valued GRT amounts.
#[derive(Debug, Clone)]
pub struct Deployment {
    /// IPFS hash identifying the deployment.
    pub id: DeploymentId,
    /// Signal committed by the acting party, wei-scaled.
    pub signal_amount_wei: u128,
    /// Total signal committed by all curators, wei-scaled.
    pub signalled_tokens_wei: u128,
}

/// A curation opportunity: one deployment's pool state plus the derived
/// return metrics at its *current* signal.
///
/// Optimization does not re-derive these fields; the optimizer runs its own
/// marginal calculation against the raw pool state.
#[derive(Debug, Clone)]
pub struct Opportunity {
    id: DeploymentId,
    signal_amount: f64,
    signalled_tokens: f64,
    annual_queries: u64,
    total_earnings: f64,
    curator_share: f64,
    estimated_earnings: f64,
    apr: f64,
    weekly_queries: u64,
}

impl Opportunity {
    /// Evaluate an opportunity from a weekly query observation.
    pub fn evaluate(
        id: DeploymentId,
        signal_amount: f64,
        signalled_tokens: f64,
        weekly_queries: u64,
        model: &EarningsModel,
    ) -> Self {
        Self::from_queries(
            id,
            signal_amount,
            signalled_tokens,
            weekly_queries,
            weekly_queries * WEEKS_PER_YEAR,
            model,
        )
    }

    /// Evaluate an opportunity from an already-annualized query volume.
    ///
    /// Used where the yearly figure is the primary datum (derived views,
    /// fixtures); the weekly field is back-filled for display.
    pub fn with_annual_queries(
        id: DeploymentId,
        signal_amount: f64,
        signalled_tokens: f64,
        annual_queries: u64,
        model: &EarningsModel,
    ) -> Self {
        Self::from_queries(
            id,
            signal_amount,
            signalled_tokens,
            annual_queries / WEEKS_PER_YEAR,
            annual_queries,
            model,
        )
    }

    fn from_queries(
        id: DeploymentId,
        signal_amount: f64,
        signalled_tokens: f64,
        weekly_queries: u64,
        annual_queries: u64,
        model: &EarningsModel,
    ) -> Self {
        let total_earnings = EarningsModel::gross_earnings(annual_queries);
        let curator_share = EarningsModel::curator_pool(annual_queries);
        let PositionMetrics {
            estimated_earnings,
            apr,
        } = model.position(signal_amount, signalled_tokens, curator_share);

        Self {
            id,
            signal_amount,
            signalled_tokens,
            annual_queries,
            total_earnings,
            curator_share,
            estimated_earnings,
            apr,
            weekly_queries,
        }
    }

    /// Deployment identifier.
    pub fn id(&self) -> &DeploymentId {
        &self.id
    }

    /// Signal currently committed by the acting party, in GRT.
    pub fn signal_amount(&self) -> f64 {
        self.signal_amount
    }

    /// Total signal committed by all curators, in GRT.
    pub fn signalled_tokens(&self) -> f64 {
        self.signalled_tokens
    }

    /// Projected yearly query volume (weekly observation x 52).
    pub fn annual_queries(&self) -> u64 {
        self.annual_queries
    }

    /// Gross yearly USD revenue attributable to query volume.
    pub fn total_earnings(&self) -> f64 {
        self.total_earnings
    }

    /// The curators' collective yearly USD share.
    pub fn curator_share(&self) -> f64 {
        self.curator_share
    }

    /// Estimated yearly USD earnings at the current signal.
    pub fn estimated_earnings(&self) -> f64 {
        self.estimated_earnings
    }

    /// APR at the current signal, in percent.
    pub fn apr(&self) -> f64 {
        self.apr
    }

    /// Raw observed weekly query count.
    pub fn weekly_queries(&self) -> u64 {
        self.weekly_queries
    }

    /// Clone with the holder's stake removed from the pool and the entry
    /// stake zeroed.
    ///
    /// Models "additional allocation" scenarios for a party that already
    /// holds `held` GRT of this pool. Point-in-time metrics are kept as
    /// observed; the optimizer only reads the pool state.
    pub fn without_holding(&self, held: f64) -> Self {
        Self {
            signal_amount: 0.0,
            signalled_tokens: self.signalled_tokens - held,
            ..self.clone()
        }
    }
}

/// Build ranked opportunities from raw deployment and usage data.
///
/// Deployments absent from `weekly_queries` carry no usage observation and
/// are excluded. Opportunities with zero signal are filtered out: a
/// deployment must hold signal to be eligible for ranking or allocation.
/// Output is sorted by APR descending; ties keep input order (stable sort).
///
/// # Errors
///
/// Returns `DomainError::NonPositivePrice` if `price <= 0`.
pub fn build_opportunities(
    deployments: &[Deployment],
    weekly_queries: &HashMap<DeploymentId, u64>,
    price: f64,
) -> Result<Vec<Opportunity>, DomainError> {
    let model = EarningsModel::try_new(price)?;

    let mut opportunities: Vec<Opportunity> = deployments
        .iter()
        .filter_map(|deployment| {
            let weekly = *weekly_queries.get(&deployment.id)?;
            Some(Opportunity::evaluate(
                deployment.id.clone(),
                deployment.signal_amount_wei as f64 / WEI_PER_GRT,
                deployment.signalled_tokens_wei as f64 / WEI_PER_GRT,
                weekly,
                &model,
            ))
        })
        .filter(|opp| opp.signal_amount > 0.0)
        .collect();

    opportunities.sort_by(|a, b| b.apr.partial_cmp(&a.apr).unwrap_or(std::cmp::Ordering::Equal));

    Ok(opportunities)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grt(amount: u64) -> u128 {
        amount as u128 * 1_000_000_000_000_000_000
    }

    fn deployment(id: &str, signal: u64, signalled: u64) -> Deployment {
        Deployment {
            id: DeploymentId::from(id),
            signal_amount_wei: grt(signal),
            signalled_tokens_wei: grt(signalled),
        }
    }

    #[test]
    fn decodes_wei_amounts() {
        let deployments = vec![deployment("QmA", 1000, 10_000)];
        let usage = HashMap::from([(DeploymentId::from("QmA"), 19_230)]);

        let opps = build_opportunities(&deployments, &usage, 0.1).unwrap();
        assert_eq!(opps.len(), 1);
        assert!((opps[0].signal_amount() - 1000.0).abs() < 1e-9);
        assert!((opps[0].signalled_tokens() - 10_000.0).abs() < 1e-9);
        assert_eq!(opps[0].annual_queries(), 19_230 * 52);
    }

    #[test]
    fn excludes_deployments_without_usage() {
        let deployments = vec![deployment("QmA", 1000, 10_000), deployment("QmB", 500, 5000)];
        let usage = HashMap::from([(DeploymentId::from("QmB"), 100)]);

        let opps = build_opportunities(&deployments, &usage, 0.1).unwrap();
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].id().as_str(), "QmB");
    }

    #[test]
    fn filters_zero_signal() {
        let deployments = vec![deployment("QmZero", 0, 0)];
        let usage = HashMap::from([(DeploymentId::from("QmZero"), 1000)]);

        let opps = build_opportunities(&deployments, &usage, 0.1).unwrap();
        assert!(opps.is_empty());
    }

    #[test]
    fn sorts_by_apr_descending() {
        // Same pool share everywhere; more queries per GRT signalled = higher APR.
        let deployments = vec![
            deployment("QmLow", 1000, 10_000),
            deployment("QmHigh", 1000, 10_000),
        ];
        let usage = HashMap::from([
            (DeploymentId::from("QmLow"), 1000),
            (DeploymentId::from("QmHigh"), 5000),
        ]);

        let opps = build_opportunities(&deployments, &usage, 0.1).unwrap();
        assert_eq!(opps[0].id().as_str(), "QmHigh");
        assert!(opps[0].apr() > opps[1].apr());
    }

    #[test]
    fn rejects_non_positive_price() {
        let deployments = vec![deployment("QmA", 1000, 10_000)];
        let usage = HashMap::from([(DeploymentId::from("QmA"), 1000)]);

        assert!(matches!(
            build_opportunities(&deployments, &usage, 0.0),
            Err(DomainError::NonPositivePrice { .. })
        ));
    }
}
