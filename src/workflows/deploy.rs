//! Production deployment detection.
//!
//! Scans recent pipelines for the first successful job matching the
//! project's configured stage/job mapping and reports when production last
//! shipped. Pipelines are inspected in the order the tracker returns them
//! (most recently updated first); the first match stops the scan.

use crate::config::{AppConfig, DEFAULT_DEPLOY_REF, DEPLOY_SCAN_LIMIT};
use crate::error::AppError;
use crate::models::{Job, Pipeline};
use crate::services::Tracker;
use chrono::{DateTime, Utc};
use console::style;

/// The most recent production deployment found.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub pipeline: Pipeline,
    pub job: Job,
}

/// Deployment detector.
pub struct DeploymentQuery<'a> {
    config: &'a AppConfig,
    tracker: &'a dyn Tracker,
}

impl<'a> DeploymentQuery<'a> {
    pub fn new(config: &'a AppConfig, tracker: &'a dyn Tracker) -> Self {
        Self { config, tracker }
    }

    /// Find the most recent successful production deployment, if any.
    ///
    /// No match across all scanned pipelines is an empty result, not an
    /// error.
    pub async fn find_last(&self, project: &str) -> Result<Option<Deployment>, AppError> {
        let ref_name = self.resolve_ref(project).await?;
        let pipelines = self
            .tracker
            .get_pipelines(project, &ref_name, DEPLOY_SCAN_LIMIT)
            .await?;

        for pipeline in pipelines {
            let target = match self.config.deploy_target(project) {
                Some(target) => target,
                None => {
                    println!(
                        "No deployment mapping configured for {}; cannot match pipeline {}.",
                        project, pipeline.id
                    );
                    continue;
                }
            };

            let jobs = self.tracker.get_pipeline_jobs(project, pipeline.id).await?;
            for job in jobs {
                if job.status != "success" {
                    continue;
                }
                let stage_match = job.stage.eq_ignore_ascii_case(&target.stage);
                let job_match = target
                    .job
                    .as_deref()
                    .is_some_and(|name| job.name.eq_ignore_ascii_case(name));
                if stage_match || job_match {
                    return Ok(Some(Deployment { pipeline, job }));
                }
            }
        }
        Ok(None)
    }

    /// Ref to scan: explicit config ref, else the project default branch,
    /// else the hard-coded fallback.
    async fn resolve_ref(&self, project: &str) -> Result<String, AppError> {
        if let Some(ref_name) = &self.config.deploy_ref {
            return Ok(ref_name.clone());
        }
        let project = self.tracker.get_project(project).await?;
        Ok(project
            .default_branch
            .unwrap_or_else(|| DEFAULT_DEPLOY_REF.to_string()))
    }
}

/// Print the deployment report, or the empty-result notice.
pub fn display(deployment: Option<&Deployment>) {
    let Some(deployment) = deployment else {
        println!("No production deployment found.");
        return;
    };

    let pipeline = &deployment.pipeline;
    let job = &deployment.job;

    println!("{}", style("Last production deployment").bold());
    println!(
        "  Pipeline #{} ({}) on {}",
        pipeline.id, pipeline.status, pipeline.ref_name
    );
    println!("  Job: {} ({})", job.name, job.status);
    if let Some(started) = &job.started_at {
        println!("  Started:  {}", started);
    }
    if let Some(finished) = &job.finished_at {
        println!("  Finished: {}", finished);
        if let Some(elapsed) = elapsed_since(finished, Utc::now()) {
            println!("  ({})", elapsed);
        }
    }
    if let Some(duration) = job.duration {
        println!("  Duration: {}s", duration.round() as i64);
    }
    println!("  Commit: {}", short_sha(&pipeline.sha));
    println!("  {}", pipeline.web_url);
}

/// Shorten a commit SHA to 8 characters.
pub fn short_sha(sha: &str) -> &str {
    sha.get(..8).unwrap_or(sha)
}

/// Elapsed time since a timestamp, in the coarsest non-zero whole unit:
/// days, else hours, else minutes.
pub fn elapsed_since(finished_at: &str, now: DateTime<Utc>) -> Option<String> {
    let finished = DateTime::parse_from_rfc3339(finished_at).ok()?;
    let elapsed = now.signed_duration_since(finished.with_timezone(&Utc));

    let text = if elapsed.num_days() > 0 {
        format!("{} day(s) ago", elapsed.num_days())
    } else if elapsed.num_hours() > 0 {
        format!("{} hour(s) ago", elapsed.num_hours())
    } else {
        format!("{} minute(s) ago", elapsed.num_minutes().max(0))
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_short_sha() {
        assert_eq!(short_sha("0123456789abcdef"), "01234567");
        assert_eq!(short_sha("abc"), "abc");
    }

    #[test]
    fn test_elapsed_prefers_days() {
        let now = Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap();
        assert_eq!(
            elapsed_since("2026-08-22T11:00:00Z", now).unwrap(),
            "3 day(s) ago"
        );
    }

    #[test]
    fn test_elapsed_falls_back_to_hours() {
        let now = Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap();
        assert_eq!(
            elapsed_since("2026-08-25T07:30:00Z", now).unwrap(),
            "4 hour(s) ago"
        );
    }

    #[test]
    fn test_elapsed_falls_back_to_minutes() {
        let now = Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap();
        assert_eq!(
            elapsed_since("2026-08-25T11:48:00Z", now).unwrap(),
            "12 minute(s) ago"
        );
    }

    #[test]
    fn test_elapsed_zero_is_zero_minutes() {
        let now = Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap();
        assert_eq!(
            elapsed_since("2026-08-25T12:00:00Z", now).unwrap(),
            "0 minute(s) ago"
        );
    }

    #[test]
    fn test_elapsed_unparseable_timestamp() {
        assert!(elapsed_since("not a date", Utc::now()).is_none());
    }
}
