//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file with an environment variable
//! override for the sensitive gateway key (`GRAPH_API_KEY`), which is never
//! read from the file.

use serde::Deserialize;
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};
use crate::optimizer::{STEP_FLOOR, STEP_SIZE};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

#[derive(Debug, Deserialize)]
pub struct NetworkConfig {
    /// Gateway endpoint for the network subgraph (deployments, curator
    /// positions). `{api_key}` is substituted at load time.
    pub graph_api_url: String,
    /// Gateway endpoint for the GRT price pair.
    pub price_api_url: String,
    /// Endpoint serving trailing 7-day query counts per deployment.
    pub usage_api_url: String,
    /// Gateway API key, loaded from the `GRAPH_API_KEY` env var at runtime.
    #[serde(skip)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Optimizer tuning. The concentration cap, entry cost, and step floor are
/// fixed policy and deliberately not configurable.
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizerConfig {
    /// Initial step size for the adaptive policy, GRT. Must be at least
    /// the step floor: a smaller initial step could never halve and would
    /// degenerate into fixed increments.
    #[serde(default = "default_step_size")]
    pub step_size: f64,
    /// Increment used when running with `--fixed-step`, GRT.
    #[serde(default = "default_fixed_increment")]
    pub fixed_increment: f64,
}

fn default_step_size() -> f64 {
    STEP_SIZE
}

fn default_fixed_increment() -> f64 {
    100.0
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            step_size: default_step_size(),
            fixed_increment: default_fixed_increment(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;

        let mut config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;

        // The gateway key comes only from the environment, never the file.
        config.network.api_key = std::env::var("GRAPH_API_KEY").ok();

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.network.graph_api_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "graph_api_url",
            }
            .into());
        }
        if self.network.price_api_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "price_api_url",
            }
            .into());
        }
        if self.network.usage_api_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "usage_api_url",
            }
            .into());
        }
        if self.optimizer.step_size < STEP_FLOOR {
            return Err(ConfigError::InvalidValue {
                field: "optimizer.step_size",
                reason: format!(
                    "must be at least the {STEP_FLOOR} GRT step floor, got {}",
                    self.optimizer.step_size
                ),
            }
            .into());
        }
        if self.optimizer.fixed_increment <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "optimizer.fixed_increment",
                reason: format!("must be positive, got {}", self.optimizer.fixed_increment),
            }
            .into());
        }
        Ok(())
    }

    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig {
                graph_api_url: "https://gateway.thegraph.com/api/{api_key}/subgraphs/id/DZz4kDTdmzWLWsV373w2bSmoar3umKKH9y82SUKr5qmp".into(),
                price_api_url: "https://gateway.thegraph.com/api/{api_key}/subgraphs/id/4RTrnxLZ4H8EBdpAQTcVc7LQY9kk85WNLyVzg5iXFQCH".into(),
                usage_api_url: "http://localhost:8000/query-counts".into(),
                api_key: None,
            },
            logging: LoggingConfig {
                level: "info".into(),
                format: "pretty".into(),
            },
            optimizer: OptimizerConfig::default(),
        }
    }
}
