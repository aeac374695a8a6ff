//! git-happens - GitLab workflow automation from the terminal.
//!
//! Two pipelines around one tracker client: turning a one-line title into a
//! linked issue, branch and merge request, and delivering AI review
//! findings as inline merge request comments.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod workflows;
