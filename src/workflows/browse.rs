//! Open the current branch's merge request in the browser.

use crate::error::AppError;
use crate::services::{Tracker, Vcs};
use crate::workflows::handoff::current_merge_request;
use std::process::Command;

/// Platform launcher command for URLs.
#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(not(target_os = "macos"))]
const OPENER: &str = "xdg-open";

/// Find the active merge request and hand its URL to the platform opener.
pub async fn run(tracker: &dyn Tracker, vcs: &dyn Vcs) -> Result<(), AppError> {
    let (_, mr) = current_merge_request(tracker, vcs).await?;
    println!("Opening {}", mr.web_url);

    let status = Command::new(OPENER)
        .arg(&mr.web_url)
        .status()
        .map_err(|e| AppError::internal(format!("failed to run {}: {}", OPENER, e)))?;
    if !status.success() {
        return Err(AppError::internal(format!(
            "{} exited with {}",
            OPENER, status
        )));
    }
    Ok(())
}
