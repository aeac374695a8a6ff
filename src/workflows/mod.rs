//! Orchestration pipelines.

pub mod browse;
pub mod deploy;
pub mod handoff;
pub mod issue_flow;
pub mod report;
pub mod review;
pub mod summary;
pub mod templates;
pub mod timebox;

pub use deploy::DeploymentQuery;
pub use handoff::HandoffOptions;
pub use issue_flow::{IssueFlowOptions, IssuePipeline};
pub use review::ReviewDelivery;
