//! Network subgraph gateway client.
//!
//! Fetches deployment records, the GRT price pair, and per-wallet curation
//! positions from The Graph gateway. One bounded request per call; the
//! deployment page is filtered server-side to undenied deployments with at
//! least 100 GRT signalled, matching what the model can usefully rank.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::NetworkConfig;
use crate::domain::{Deployment, DeploymentId, WEI_PER_GRT};
use crate::error::{FeedError, Result};

use super::{DeploymentFeed, PositionFeed, PriceFeed};

const DEPLOYMENTS_QUERY: &str = r#"
{
  subgraphDeployments(first: 1000, where: {deniedAt: 0, signalledTokens_gt: "100000000000000000000"}, orderBy: signalledTokens, orderDirection: desc) {
    ipfsHash
    signalAmount
    signalledTokens
  }
}
"#;

const PRICE_QUERY: &str = r#"
{
  assetPairs(
    first: 1
    where: {asset: "0xc944e90c64b2c07662a292be6244bdf05cda44a7", comparedAsset: "0x0000000000000000000000000000000000000348"}
  ) {
    currentPrice
  }
}
"#;

const SIGNALS_QUERY: &str = r#"
query($wallet: String!) {
  curator(id: $wallet) {
    nameSignals(first: 1000) {
      signal
      subgraph {
        currentVersion {
          subgraphDeployment {
            ipfsHash
          }
        }
      }
    }
  }
}
"#;

const BALANCE_QUERY: &str = r#"
query($wallet: String!) {
  graphAccounts(where: {id: $wallet}) {
    balance
  }
}
"#;

/// GraphQL client over the gateway's network and price subgraphs.
pub struct GraphClient {
    http: reqwest::Client,
    graph_url: String,
    price_url: String,
}

impl GraphClient {
    pub fn new(network: &NetworkConfig) -> Self {
        let key = network.api_key.as_deref().unwrap_or_default();
        Self {
            http: reqwest::Client::new(),
            graph_url: network.graph_api_url.replace("{api_key}", key),
            price_url: network.price_api_url.replace("{api_key}", key),
        }
    }

    async fn post_query<T: DeserializeOwned>(
        &self,
        url: &str,
        endpoint: &'static str,
        body: serde_json::Value,
    ) -> Result<T> {
        let response = self.http.post(url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::BadStatus {
                endpoint,
                status: status.as_u16(),
            }
            .into());
        }

        let envelope: GraphResponse<T> = response.json().await?;
        envelope.data.ok_or_else(|| {
            FeedError::MissingData {
                endpoint,
                reason: "response carried no data field".into(),
            }
            .into()
        })
    }
}

#[async_trait]
impl DeploymentFeed for GraphClient {
    async fn deployments(&self) -> Result<Vec<Deployment>> {
        let data: DeploymentsData = self
            .post_query(
                &self.graph_url,
                "deployments",
                serde_json::json!({ "query": DEPLOYMENTS_QUERY }),
            )
            .await?;

        let deployments = data
            .subgraph_deployments
            .into_iter()
            .map(|row| {
                Ok(Deployment {
                    id: DeploymentId::new(row.ipfs_hash),
                    signal_amount_wei: parse_wei("signalAmount", &row.signal_amount)?,
                    signalled_tokens_wei: parse_wei("signalledTokens", &row.signalled_tokens)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(count = deployments.len(), "fetched deployments");
        Ok(deployments)
    }
}

#[async_trait]
impl PriceFeed for GraphClient {
    async fn grt_price(&self) -> Result<f64> {
        let data: PriceData = self
            .post_query(
                &self.price_url,
                "price",
                serde_json::json!({ "query": PRICE_QUERY }),
            )
            .await?;

        let pair = data.asset_pairs.first().ok_or(FeedError::MissingData {
            endpoint: "price",
            reason: "no asset pair returned".into(),
        })?;

        pair.current_price
            .parse::<f64>()
            .map_err(|_| {
                FeedError::BadAmount {
                    field: "currentPrice",
                    value: pair.current_price.clone(),
                }
                .into()
            })
    }
}

#[async_trait]
impl PositionFeed for GraphClient {
    async fn curation_signals(&self, wallet: &str) -> Result<HashMap<DeploymentId, f64>> {
        let data: CuratorData = self
            .post_query(
                &self.graph_url,
                "signals",
                serde_json::json!({
                    "query": SIGNALS_QUERY,
                    "variables": { "wallet": wallet.to_lowercase() },
                }),
            )
            .await?;

        let mut signals = HashMap::new();
        let Some(curator) = data.curator else {
            return Ok(signals);
        };

        for name_signal in curator.name_signals {
            let Some(ipfs_hash) = name_signal
                .subgraph
                .current_version
                .and_then(|v| v.subgraph_deployment.ipfs_hash)
            else {
                continue;
            };
            let amount = parse_grt("signal", &name_signal.signal)?;
            signals.insert(DeploymentId::new(ipfs_hash), amount);
        }

        debug!(wallet, positions = signals.len(), "fetched curation signals");
        Ok(signals)
    }

    async fn account_balance(&self, wallet: &str) -> Result<f64> {
        let data: AccountsData = self
            .post_query(
                &self.graph_url,
                "balance",
                serde_json::json!({
                    "query": BALANCE_QUERY,
                    "variables": { "wallet": wallet.to_lowercase() },
                }),
            )
            .await?;

        match data.graph_accounts.first() {
            Some(account) => parse_grt("balance", &account.balance),
            None => Ok(0.0),
        }
    }
}

fn parse_wei(field: &'static str, value: &str) -> Result<u128> {
    value.parse::<u128>().map_err(|_| {
        FeedError::BadAmount {
            field,
            value: value.to_string(),
        }
        .into()
    })
}

fn parse_grt(field: &'static str, value: &str) -> Result<f64> {
    let wei = value.parse::<f64>().map_err(|_| FeedError::BadAmount {
        field,
        value: value.to_string(),
    })?;
    Ok(wei / WEI_PER_GRT)
}

#[derive(Deserialize)]
struct GraphResponse<T> {
    data: Option<T>,
}

#[derive(Deserialize)]
struct DeploymentsData {
    #[serde(rename = "subgraphDeployments")]
    subgraph_deployments: Vec<DeploymentRow>,
}

#[derive(Deserialize)]
struct DeploymentRow {
    #[serde(rename = "ipfsHash")]
    ipfs_hash: String,
    #[serde(rename = "signalAmount")]
    signal_amount: String,
    #[serde(rename = "signalledTokens")]
    signalled_tokens: String,
}

#[derive(Deserialize)]
struct PriceData {
    #[serde(rename = "assetPairs")]
    asset_pairs: Vec<AssetPair>,
}

#[derive(Deserialize)]
struct AssetPair {
    #[serde(rename = "currentPrice")]
    current_price: String,
}

#[derive(Deserialize)]
struct CuratorData {
    curator: Option<Curator>,
}

#[derive(Deserialize)]
struct Curator {
    #[serde(rename = "nameSignals")]
    name_signals: Vec<NameSignal>,
}

#[derive(Deserialize)]
struct NameSignal {
    signal: String,
    subgraph: Subgraph,
}

#[derive(Deserialize)]
struct Subgraph {
    #[serde(rename = "currentVersion")]
    current_version: Option<CurrentVersion>,
}

#[derive(Deserialize)]
struct CurrentVersion {
    #[serde(rename = "subgraphDeployment")]
    subgraph_deployment: SubgraphDeploymentRef,
}

#[derive(Deserialize)]
struct SubgraphDeploymentRef {
    #[serde(rename = "ipfsHash")]
    ipfs_hash: Option<String>,
}

#[derive(Deserialize)]
struct AccountsData {
    #[serde(rename = "graphAccounts")]
    graph_accounts: Vec<AccountRow>,
}

#[derive(Deserialize)]
struct AccountRow {
    balance: String,
}
