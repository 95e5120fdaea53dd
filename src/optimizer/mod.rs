//! Greedy, step-adaptive allocation of a GRT budget across opportunities.
//!
//! The optimizer repeatedly finds the opportunity whose next increment of
//! allocation yields the best marginal APR, commits the increment, and
//! repeats under an adaptive step size until the budget is exhausted or no
//! improving increment remains. This is a hill-climbing heuristic, chosen
//! for explainability over a provably optimal allocation; do not swap it
//! for an LP formulation without revisiting every test keyed to the greedy
//! behavior.
//!
//! Each `optimize` call is pure and self-contained: the accumulator state
//! lives on the stack, the budget is an explicit parameter, and nothing is
//! shared across runs. Callers may run optimizations for different wallets
//! or budgets in parallel without coordination.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::domain::error::DomainError;
use crate::domain::{DeploymentId, EarningsModel, Opportunity, PositionMetrics};

/// One-time friction charged when a position moves from zero to nonzero
/// allocation, as a fraction of the allocated amount.
pub const ENTRY_COST_PCT: f64 = 0.005;

/// Default initial step for the adaptive policy, in GRT.
pub const STEP_SIZE: f64 = 10.0;

/// Floor below which the adaptive policy stops halving, in GRT.
pub const STEP_FLOOR: f64 = 10.0;

/// Hard ceiling on loop passes; guarantees termination for any
/// budget/step combination (budget / STEP_FLOOR must stay below this).
pub const MAX_ITERATIONS: u32 = 1000;

/// Per-opportunity concentration cap, as a fraction of the total budget.
pub const MAX_POSITION_PCT: f64 = 0.10;

/// Step-size policy for the greedy loop.
///
/// `Fixed` is the "signal distribution" variant: same loop, constant
/// increments, and termination instead of halving when no opportunity
/// qualifies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepPolicy {
    /// Start at `initial` GRT and halve (never below [`STEP_FLOOR`]) when
    /// no opportunity qualifies.
    Adaptive {
        /// Initial step size, GRT.
        initial: f64,
    },
    /// Commit constant increments; give up as soon as no opportunity
    /// qualifies.
    Fixed {
        /// Increment size, GRT.
        increment: f64,
    },
}

impl Default for StepPolicy {
    fn default() -> Self {
        Self::Adaptive { initial: STEP_SIZE }
    }
}

impl StepPolicy {
    fn initial_step(self) -> f64 {
        match self {
            Self::Adaptive { initial } => initial,
            Self::Fixed { increment } => increment,
        }
    }

    /// Next smaller step to retry with, or `None` to terminate.
    fn reduced(self, step: f64) -> Option<f64> {
        match self {
            Self::Adaptive { .. } if step > STEP_FLOOR => Some(STEP_FLOOR.max(step / 2.0)),
            _ => None,
        }
    }
}

/// Output of one optimization run.
///
/// `allocations` holds keys only for opportunities that received a positive
/// amount. `total_allocated` equals the budget to floating-point tolerance
/// unless the run terminated early with every opportunity capped or
/// unattractive.
#[derive(Debug, Clone)]
pub struct AllocationResult {
    /// GRT allocated per deployment.
    pub allocations: HashMap<DeploymentId, f64>,
    /// Sum of all allocated amounts, GRT.
    pub total_allocated: f64,
    /// Unweighted mean APR across positions with allocation > 0, percent.
    pub expected_apr: f64,
    /// Aggregate yearly USD earnings net of entry costs.
    pub expected_earnings: f64,
}

/// Distributes a budget across opportunities to maximize portfolio APR,
/// respecting the concentration cap and charging entry costs on new
/// positions.
pub struct AllocationOptimizer<'a> {
    opportunities: &'a [Opportunity],
    model: EarningsModel,
    policy: StepPolicy,
}

impl<'a> AllocationOptimizer<'a> {
    /// Create an optimizer over `opportunities` at the given GRT price,
    /// using the default adaptive step policy.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NonPositivePrice` if `price <= 0`.
    pub fn new(opportunities: &'a [Opportunity], price: f64) -> Result<Self, DomainError> {
        Self::with_policy(opportunities, price, StepPolicy::default())
    }

    /// Create an optimizer with an explicit step policy.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NonPositivePrice` if `price <= 0`.
    pub fn with_policy(
        opportunities: &'a [Opportunity],
        price: f64,
        policy: StepPolicy,
    ) -> Result<Self, DomainError> {
        let model = EarningsModel::try_new(price)?;
        Ok(Self {
            opportunities,
            model,
            policy,
        })
    }

    /// APR of `opportunity` if the allocator's total stake in it were
    /// `hypothetical_allocation` GRT, in percent.
    ///
    /// The allocator's contribution enlarges both its own stake and the
    /// pool it shares, so the increment is added to numerator and
    /// denominator alike. If `current_allocation` is exactly 0 this is a
    /// new position and the one-time entry cost is subtracted as a flat
    /// percentage-point penalty, discouraging spreading the budget across
    /// many marginal new positions.
    pub fn marginal_apr(
        &self,
        opportunity: &Opportunity,
        current_allocation: f64,
        hypothetical_allocation: f64,
    ) -> f64 {
        let metrics = self.allocation_metrics(opportunity, hypothetical_allocation);
        if current_allocation == 0.0 {
            metrics.apr - ENTRY_COST_PCT * 100.0
        } else {
            metrics.apr
        }
    }

    /// Earnings and APR at a hypothetical additional allocation, without
    /// the entry-cost penalty. Query volume and the resulting fee pool are
    /// constants of the run; only the stake ratio moves.
    fn allocation_metrics(&self, opportunity: &Opportunity, additional: f64) -> PositionMetrics {
        let signal_amount = opportunity.signal_amount() + additional;
        let signalled_tokens = opportunity.signalled_tokens() + additional;
        let curator_pool = EarningsModel::curator_pool(opportunity.annual_queries());
        self.model.position(signal_amount, signalled_tokens, curator_pool)
    }

    /// Find the opportunity whose next `step` of allocation yields the
    /// strictly highest marginal APR. Opportunities already at the cap are
    /// skipped; ties go to the first encountered, i.e. the highest base
    /// APR given the input ordering.
    fn find_best(
        &self,
        allocations: &HashMap<DeploymentId, f64>,
        budget: f64,
        step: f64,
    ) -> Option<(usize, f64)> {
        let cap = budget * MAX_POSITION_PCT;
        let mut best: Option<(usize, f64)> = None;
        let mut best_apr = -1.0;

        for (index, opp) in self.opportunities.iter().enumerate() {
            let current = allocations.get(opp.id()).copied().unwrap_or(0.0);
            if current >= cap {
                continue;
            }

            let apr = self.marginal_apr(opp, current, current + step);
            if apr > best_apr {
                best_apr = apr;
                best = Some((index, apr));
            }
        }

        best
    }

    /// Distribute `budget` GRT across the opportunity set.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NonPositiveBudget` if `budget <= 0`; no
    /// partial result is produced. An empty opportunity set is not an
    /// error: the result simply reports zero allocation.
    pub fn optimize(&self, budget: f64) -> Result<AllocationResult, DomainError> {
        if !(budget > 0.0) || !budget.is_finite() {
            return Err(DomainError::NonPositiveBudget { budget });
        }

        let mut allocations: HashMap<DeploymentId, f64> = HashMap::new();
        let mut remaining = budget;
        let mut step = self.policy.initial_step();
        let mut iterations = 0u32;

        while remaining > 0.0 && iterations < MAX_ITERATIONS {
            iterations += 1;

            if step > remaining {
                step = remaining;
            }

            let Some((index, marginal)) = self.find_best(&allocations, budget, step) else {
                // All capped or nothing qualifies at this step.
                match self.policy.reduced(step) {
                    Some(smaller) => {
                        trace!(step, smaller, "no qualifying opportunity, reducing step");
                        step = smaller;
                        continue;
                    }
                    None => break,
                }
            };

            let winner = &self.opportunities[index];
            let current = allocations.get(winner.id()).copied().unwrap_or(0.0);
            let room = budget * MAX_POSITION_PCT - current;
            if room <= 0.0 {
                // Selection skips capped positions, so only rounding lands
                // here; treat it as a no-commit pass.
                match self.policy.reduced(step) {
                    Some(smaller) => {
                        step = smaller;
                        continue;
                    }
                    None => break,
                }
            }

            // Step is already clamped to the remaining budget.
            let increment = step.min(room);
            *allocations.entry(winner.id().clone()).or_insert(0.0) += increment;
            remaining -= increment;

            trace!(
                deployment = %winner.id(),
                increment,
                marginal_apr = marginal,
                remaining,
                "committed allocation step"
            );
        }

        let total_allocated: f64 = allocations.values().sum();
        let (expected_earnings, expected_apr) = self.portfolio_metrics(&allocations);

        debug!(
            iterations,
            total_allocated,
            remaining = budget - total_allocated,
            positions = allocations.len(),
            expected_apr,
            "optimization finished"
        );

        Ok(AllocationResult {
            allocations,
            total_allocated,
            expected_apr,
            expected_earnings,
        })
    }

    /// Portfolio-wide metrics at the final allocation: weighted earnings
    /// sum net of entry costs, and the *unweighted* mean of per-position
    /// APRs. The asymmetry is deliberate policy; preserve it.
    fn portfolio_metrics(&self, allocations: &HashMap<DeploymentId, f64>) -> (f64, f64) {
        let total_allocated: f64 = allocations.values().sum();
        if total_allocated == 0.0 {
            return (0.0, 0.0);
        }

        // Every position in a run starts from zero, so each one pays the
        // one-time entry cost on the full allocated amount.
        let new_positions = allocations.values().filter(|v| **v > 0.0).count();
        let total_entry_cost = total_allocated * ENTRY_COST_PCT * new_positions as f64;

        let mut total_earnings = 0.0;
        let mut position_aprs = Vec::new();
        for opp in self.opportunities {
            let Some(&allocation) = allocations.get(opp.id()) else {
                continue;
            };
            if allocation <= 0.0 {
                continue;
            }
            let metrics = self.allocation_metrics(opp, allocation);
            total_earnings += metrics.estimated_earnings;
            position_aprs.push(metrics.apr);
        }

        let net_earnings = total_earnings - total_entry_cost * self.model.price();
        let portfolio_apr = if position_aprs.is_empty() {
            0.0
        } else {
            position_aprs.iter().sum::<f64>() / position_aprs.len() as f64
        };

        (net_earnings, portfolio_apr)
    }
}
