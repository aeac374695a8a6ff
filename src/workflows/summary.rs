//! Recent-work summaries from the local commit log.
//!
//! `summary` prints the raw one-line log of the current branch against the
//! default branch; `summaryAI` asks the language model for a short digest
//! of the same log.

use crate::error::AppError;
use crate::services::{Completion, ResponseFormat, Vcs};
use console::style;

const SUMMARY_SYSTEM_PROMPT: &str = "You are a concise release-notes writer. \
Summarize the following git commit log in a few bullet points for a \
standup update. Group related commits, skip noise, plain text only.";

/// Commit log since the default branch, or `None` when it is empty.
fn branch_log(vcs: &dyn Vcs) -> Result<Option<String>, AppError> {
    let default_branch = vcs.default_branch().unwrap_or_else(|_| "master".to_string());
    let log = vcs.recent_commits(&default_branch)?;
    if log.trim().is_empty() {
        println!(
            "{} No commits on top of {}.",
            style("ℹ").cyan(),
            default_branch
        );
        return Ok(None);
    }
    Ok(Some(log))
}

/// Print the raw commit digest.
pub fn run(vcs: &dyn Vcs) -> Result<(), AppError> {
    if let Some(log) = branch_log(vcs)? {
        println!("{}", style("Recent commits").bold());
        println!("{}", log);
    }
    Ok(())
}

/// Print a language-model summary of the commit digest.
pub async fn run_ai(vcs: &dyn Vcs, completion: &dyn Completion) -> Result<(), AppError> {
    let Some(log) = branch_log(vcs)? else {
        return Ok(());
    };
    let summary = completion
        .complete(SUMMARY_SYSTEM_PROMPT, &log, ResponseFormat::Text)
        .await?;
    println!("{}", style("Summary").bold());
    println!("{}", summary);
    Ok(())
}
