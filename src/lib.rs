//! Curopt - curation signal allocation optimization for The Graph.
//!
//! This crate ranks subgraph deployments by curation APR and greedily
//! allocates a GRT budget across them under a per-deployment concentration
//! cap and a one-time entry cost on new positions.
//!
//! # Architecture
//!
//! - **`domain`** - pure model: `Opportunity` records, the earnings/APR
//!   formulas, and the per-wallet derived view. No I/O.
//! - **`optimizer`** - the greedy, step-adaptive allocation search
//!   (`AllocationOptimizer`) with pluggable `StepPolicy`.
//! - **`feed`** - async ports to the upstream collaborators (network
//!   subgraph gateway, query-volume service) and their HTTP clients.
//! - **`config`** - TOML configuration with env-only secrets and logging
//!   setup.
//! - **`app`** / **`output`** - thin orchestration and table rendering.
//!
//! # Example
//!
//! ```
//! use curopt::domain::{build_opportunities, Deployment, DeploymentId};
//! use curopt::optimizer::AllocationOptimizer;
//! use std::collections::HashMap;
//!
//! let deployments = vec![Deployment {
//!     id: DeploymentId::from("QmExample"),
//!     signal_amount_wei: 1_000_000_000_000_000_000_000,
//!     signalled_tokens_wei: 10_000_000_000_000_000_000_000,
//! }];
//! let usage = HashMap::from([(DeploymentId::from("QmExample"), 19_230u64)]);
//!
//! let opportunities = build_opportunities(&deployments, &usage, 0.1).unwrap();
//! let optimizer = AllocationOptimizer::new(&opportunities, 0.1).unwrap();
//! let result = optimizer.optimize(100.0).unwrap();
//! assert!(result.total_allocated <= 100.0);
//! ```

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod feed;
pub mod optimizer;
pub mod output;
