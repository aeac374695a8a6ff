//! Data model types.

pub mod review;
pub mod template;
pub mod timebox;
pub mod tracker;

pub use review::{Finding, ReviewReport, Severity};
pub use template::{IssueTemplate, ProjectTargets};
pub use timebox::{Iteration, Milestone, TimeWindowed};
pub use tracker::{
    Branch, DiffRefs, Epic, GitLabProject, GitLabUser, Issue, Job, Label, Member, MergeRequest,
    MergeRequestUpdate, NewIssue, NewMergeRequest, Pipeline,
};
