//! Feed ports: typed boundaries to the upstream data collaborators.
//!
//! The core never performs I/O itself; it consumes the plain records these
//! traits yield. Retry/backoff and pagination belong to the collaborators
//! behind the endpoints, not to this crate.

mod graph;
mod usage;

pub use graph::GraphClient;
pub use usage::UsageClient;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{Deployment, DeploymentId};
use crate::error::Result;

/// Source of raw deployment records (wei-scaled signal amounts).
#[async_trait]
pub trait DeploymentFeed: Send + Sync {
    async fn deployments(&self) -> Result<Vec<Deployment>>;
}

/// Source of trailing 7-day query counts per deployment.
#[async_trait]
pub trait UsageFeed: Send + Sync {
    async fn weekly_query_counts(&self) -> Result<HashMap<DeploymentId, u64>>;
}

/// Source of the GRT->USD conversion rate.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn grt_price(&self) -> Result<f64>;
}

/// Source of a wallet's current curation positions and balance.
#[async_trait]
pub trait PositionFeed: Send + Sync {
    /// Signal held per deployment, GRT.
    async fn curation_signals(&self, wallet: &str) -> Result<HashMap<DeploymentId, f64>>;

    /// Liquid GRT balance of the wallet.
    async fn account_balance(&self, wallet: &str) -> Result<f64>;
}
