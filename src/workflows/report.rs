//! Incident reporting: a minimal issue plus spent time.
//!
//! `report "<text>" <minutes>` creates an incident-typed issue with no
//! enrichment, no branch and no merge request, then records the time
//! straight onto it.

use crate::error::AppError;
use crate::models::NewIssue;
use crate::services::git::project_from_remote_url;
use crate::services::{Tracker, Vcs};
use console::style;

/// Create the incident issue and record the spent time.
pub async fn run(
    tracker: &dyn Tracker,
    vcs: &dyn Vcs,
    project: Option<&str>,
    text: &str,
    minutes: i64,
) -> Result<(), AppError> {
    if minutes <= 0 {
        return Err(AppError::invalid_input(format!(
            "minutes must be positive, got {}",
            minutes
        )));
    }

    let project = match project {
        Some(p) => p.to_string(),
        None => {
            let remote = vcs.remote_url()?;
            project_from_remote_url(&remote).ok_or_else(|| {
                AppError::invalid_input(format!(
                    "cannot derive a project from remote {:?}; pass --project",
                    remote
                ))
            })?
        }
    };

    let user = tracker.get_user().await?;
    let issue = tracker
        .create_issue(
            &project,
            &NewIssue {
                title: text.to_string(),
                issue_type: Some("incident".to_string()),
                assignee_ids: Some(vec![user.id]),
                ..Default::default()
            },
        )
        .await?;
    tracker
        .add_spent_time(&project, issue.iid, &format!("{}m", minutes))
        .await?;

    println!(
        "{} Incident #{} created with {}m logged.",
        style("✓").green(),
        issue.iid,
        minutes
    );
    println!("  {}", issue.web_url);
    Ok(())
}
