//! Network-agnostic domain logic.

pub mod error;

mod earnings;
mod ids;
mod opportunity;
mod user;

pub use earnings::{EarningsModel, PositionMetrics, CURATOR_SHARE, EARNINGS_PER_100K_QUERIES};
pub use ids::DeploymentId;
pub use opportunity::{build_opportunities, Deployment, Opportunity, WEEKS_PER_YEAR, WEI_PER_GRT};
pub use user::{adjust_for_holdings, build_user_opportunities, UserOpportunity};
