//! App orchestration module.
//!
//! Wires the feed clients to the opportunity model and the allocation
//! optimizer, then hands the typed results to the table renderer. All I/O
//! happens here at the edges; the model and optimizer stay pure.

use tracing::{info, warn};

use crate::config::Config;
use crate::domain::{adjust_for_holdings, build_opportunities, build_user_opportunities};
use crate::error::{ConfigError, Result};
use crate::feed::{DeploymentFeed, GraphClient, PositionFeed, PriceFeed, UsageClient, UsageFeed};
use crate::optimizer::{AllocationOptimizer, StepPolicy};
use crate::output;

/// Per-invocation options parsed from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// GRT budget to allocate; falls back to the wallet's balance.
    pub budget: Option<f64>,
    /// Wallet whose current positions shape the run.
    pub wallet: Option<String>,
    /// Use the fixed-increment step policy instead of adaptive halving.
    pub fixed_step: bool,
    /// Number of opportunity rows to print.
    pub top: usize,
}

/// Main application struct.
pub struct App;

impl App {
    /// Run one optimization pass: fetch, model, optimize, render.
    pub async fn run(config: Config, options: RunOptions) -> Result<()> {
        let graph = GraphClient::new(&config.network);
        let usage = UsageClient::new(config.network.usage_api_url.clone());

        let deployments = graph.deployments().await?;
        let weekly_queries = usage.weekly_query_counts().await?;
        let price = graph.grt_price().await?;

        info!(
            deployments = deployments.len(),
            usage_entries = weekly_queries.len(),
            price,
            "upstream data loaded"
        );

        let opportunities = build_opportunities(&deployments, &weekly_queries, price)?;
        if opportunities.is_empty() {
            warn!("no rankable opportunities (no deployment has both signal and usage)");
            return Ok(());
        }

        output::print_opportunities(&opportunities, options.top);

        let mut candidates = opportunities.clone();
        let mut budget = options.budget;

        if let Some(wallet) = &options.wallet {
            let signals = graph.curation_signals(wallet).await?;
            if signals.is_empty() {
                info!(wallet, "wallet holds no curation signal");
            } else {
                let positions = build_user_opportunities(&signals, &opportunities, price)?;
                output::print_positions(&positions);
                // Model additional allocation on top of current holdings.
                candidates = adjust_for_holdings(&opportunities, &signals);
            }

            if budget.is_none() {
                let balance = graph.account_balance(wallet).await?;
                info!(wallet, balance, "using wallet balance as budget");
                budget = Some(balance);
            }
        }

        let budget = budget.ok_or(ConfigError::MissingField { field: "budget" })?;

        let policy = if options.fixed_step {
            StepPolicy::Fixed {
                increment: config.optimizer.fixed_increment,
            }
        } else {
            StepPolicy::Adaptive {
                initial: config.optimizer.step_size,
            }
        };

        let optimizer = AllocationOptimizer::with_policy(&candidates, price, policy)?;
        let result = optimizer.optimize(budget)?;

        output::print_allocation(&result, budget);

        Ok(())
    }
}
