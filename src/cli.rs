//! Command-line surface.
//!
//! The default invocation takes a free-text issue title and runs the issue
//! pipeline; a handful of first-word subcommands cover the other workflows.

use clap::{Parser, Subcommand};

/// Automate GitLab issue, branch and merge request chores.
#[derive(Debug, Parser)]
#[command(name = "git-happens", version, about)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Title of the issue (free text).
    #[arg(value_name = "TITLE")]
    pub title: Vec<String>,

    /// Id or URL-encoded path of the target project.
    #[arg(long, global = true)]
    pub project: Option<String>,

    /// Pick the milestone manually instead of the active one.
    #[arg(short = 'm', long)]
    pub milestone: bool,

    /// Pick the iteration manually instead of the active one.
    #[arg(short = 'i', long)]
    pub iteration: bool,

    /// Skip milestone resolution.
    #[arg(long)]
    pub no_milestone: bool,

    /// Skip iteration resolution.
    #[arg(long)]
    pub no_iteration: bool,

    /// Skip epic selection.
    #[arg(long)]
    pub no_epic: bool,

    /// Create only the issue; no branch, no merge request.
    #[arg(long)]
    pub issue_only: bool,

    /// Fetch and check out the new branch afterwards.
    #[arg(long)]
    pub checkout: bool,

    /// Path to the config file (defaults to the user config directory).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<std::path::PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the current branch's merge request in the browser.
    Open,

    /// Review hand-off: AI review, time tracking, reviewer, ready state.
    Review {
        /// Pick a reviewer from the project members.
        #[arg(long)]
        reviewer: bool,

        /// Merge automatically when the pipeline succeeds.
        #[arg(long)]
        auto_merge: bool,
    },

    /// Print the commit digest of the current branch.
    Summary,

    /// Print an AI summary of the current branch's commits.
    #[command(name = "summaryAI")]
    SummaryAi,

    /// Query the most recent production state.
    Last {
        #[command(subcommand)]
        target: LastTarget,
    },

    /// Create a minimal incident issue with time tracking.
    Report {
        /// Incident description.
        text: String,

        /// Minutes spent.
        minutes: i64,
    },

    /// Store or forget the GitLab token in the OS keychain.
    Auth {
        /// Personal access token to store.
        token: Option<String>,

        /// Remove the stored token instead.
        #[arg(long)]
        forget: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum LastTarget {
    /// Most recent successful production deployment.
    Deploy,
}
