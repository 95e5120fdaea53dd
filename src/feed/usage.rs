//! Trailing-window query-volume client.
//!
//! Talks to the aggregation service that sums hourly query volume per
//! deployment over the trailing 7 days. The window length is that service's
//! policy; the model annualizes whatever weekly figure arrives.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::DeploymentId;
use crate::error::{FeedError, Result};

use super::UsageFeed;

/// HTTP client for the query-volume aggregation service.
pub struct UsageClient {
    http: reqwest::Client,
    url: String,
}

impl UsageClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl UsageFeed for UsageClient {
    async fn weekly_query_counts(&self) -> Result<HashMap<DeploymentId, u64>> {
        let response = self.http.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::BadStatus {
                endpoint: "usage",
                status: status.as_u16(),
            }
            .into());
        }

        let rows: Vec<UsageRow> = response.json().await?;

        let counts: HashMap<DeploymentId, u64> = rows
            .into_iter()
            .filter_map(|row| {
                let ipfs_hash = row.subgraph_deployment_ipfs_hash?;
                Some((DeploymentId::new(ipfs_hash), row.query_count))
            })
            .collect();

        debug!(deployments = counts.len(), "fetched weekly query counts");
        Ok(counts)
    }
}

#[derive(Deserialize)]
struct UsageRow {
    subgraph_deployment_ipfs_hash: Option<String>,
    query_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_without_hash_are_skipped() {
        let json = r#"[
            {"subgraph_deployment_ipfs_hash": "QmA", "query_count": 1000},
            {"subgraph_deployment_ipfs_hash": null, "query_count": 50}
        ]"#;
        let rows: Vec<UsageRow> = serde_json::from_str(json).unwrap();
        let counts: HashMap<DeploymentId, u64> = rows
            .into_iter()
            .filter_map(|row| {
                let hash = row.subgraph_deployment_ipfs_hash?;
                Some((DeploymentId::new(hash), row.query_count))
            })
            .collect();

        assert_eq!(counts.len(), 1);
        assert_eq!(counts[&DeploymentId::from("QmA")], 1000);
    }
}
