//! Earnings and APR formulas shared by the opportunity model and the
//! allocation optimizer.
//!
//! The return model is fixed policy: query fees accrue at a flat rate per
//! 100k annual queries, curators as a class receive a 10% share, and a
//! curator's cut is proportional to their share of the signal pool. APR is
//! the yearly USD earnings over the USD value of the signal committed.

use super::error::DomainError;

/// USD earned per 100,000 annual queries.
pub const EARNINGS_PER_100K_QUERIES: f64 = 4.0;

/// Fraction of query-fee revenue paid to curators as a class.
pub const CURATOR_SHARE: f64 = 0.10;

/// Point-in-time metrics for a single curation position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionMetrics {
    /// Estimated yearly USD earnings at the evaluated signal.
    pub estimated_earnings: f64,
    /// Annualized percentage return at the evaluated signal.
    pub apr: f64,
}

/// The return model, parameterized by the GRT->USD conversion rate.
///
/// The price is validated once at construction; every downstream formula
/// may then assume a positive denominator.
#[derive(Debug, Clone, Copy)]
pub struct EarningsModel {
    price: f64,
}

impl EarningsModel {
    /// Create a model for the given GRT price in USD.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NonPositivePrice` if `price <= 0` or is not
    /// finite.
    pub fn try_new(price: f64) -> Result<Self, DomainError> {
        if !(price > 0.0) || !price.is_finite() {
            return Err(DomainError::NonPositivePrice { price });
        }
        Ok(Self { price })
    }

    /// The GRT price this model was built with.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Gross yearly query-fee revenue for a deployment.
    pub fn gross_earnings(annual_queries: u64) -> f64 {
        (annual_queries as f64 / 100_000.0) * EARNINGS_PER_100K_QUERIES
    }

    /// The curators' collective yearly share for a deployment.
    pub fn curator_pool(annual_queries: u64) -> f64 {
        Self::gross_earnings(annual_queries) * CURATOR_SHARE
    }

    /// Fraction of the signal pool owned by `signal` out of `signalled`.
    ///
    /// Defined as 0 when the pool is empty so degenerate deployments rank
    /// as unattractive instead of crashing the evaluation.
    pub fn portion_owned(signal: f64, signalled: f64) -> f64 {
        if signalled > 0.0 {
            signal / signalled
        } else {
            0.0
        }
    }

    /// Earnings and APR for owning `signal` GRT of a `signalled` GRT pool
    /// whose curators collectively earn `curator_pool_usd` per year.
    ///
    /// APR is defined as 0 when `signal` is 0; that avoids a division by
    /// zero, not a claim that empty positions truly return nothing.
    pub fn position(&self, signal: f64, signalled: f64, curator_pool_usd: f64) -> PositionMetrics {
        let portion = Self::portion_owned(signal, signalled);
        let estimated_earnings = curator_pool_usd * portion;
        let apr = if signal > 0.0 {
            estimated_earnings / (signal * self.price) * 100.0
        } else {
            0.0
        };
        PositionMetrics {
            estimated_earnings,
            apr,
        }
    }
}
