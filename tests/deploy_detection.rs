//! Production deployment detection.
//!
//! Pipelines are scanned most-recent first; the first successful job
//! matching the project's stage/job mapping wins, and finding nothing is an
//! empty result rather than an error.

mod support;

use git_happens::config::AppConfig;
use git_happens::workflows::DeploymentQuery;
use std::collections::HashMap;
use support::{job, pipeline, StubTracker};

fn config(extra: &str) -> AppConfig {
    toml::from_str(&format!("group = \"platform\"\n{}", extra)).unwrap()
}

fn deploy_config() -> AppConfig {
    config(
        r#"
        deploy_ref = "main"

        [deployments."g/app"]
        stage = "deploy"
        "#,
    )
}

#[tokio::test]
async fn test_first_matching_pipeline_wins() {
    let mut jobs = HashMap::new();
    // Newest pipeline deployed successfully; the scan must stop there.
    jobs.insert(9, vec![job(91, "deploy-prod", "deploy", "success")]);
    jobs.insert(8, vec![job(81, "deploy-prod", "deploy", "success")]);
    let tracker = StubTracker {
        pipelines: vec![pipeline(9, "ffffffffaaaa"), pipeline(8, "eeeeeeeebbbb")],
        jobs,
        ..Default::default()
    };
    let config = deploy_config();

    let deployment = DeploymentQuery::new(&config, &tracker)
        .find_last("g/app")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(deployment.pipeline.id, 9);
    assert_eq!(deployment.job.id, 91);
}

#[tokio::test]
async fn test_failed_deploy_job_skips_to_older_pipeline() {
    let mut jobs = HashMap::new();
    jobs.insert(
        9,
        vec![
            job(90, "build", "build", "success"),
            job(91, "deploy-prod", "deploy", "failed"),
        ],
    );
    jobs.insert(8, vec![job(81, "deploy-prod", "deploy", "success")]);
    let tracker = StubTracker {
        pipelines: vec![pipeline(9, "ffffffffaaaa"), pipeline(8, "eeeeeeeebbbb")],
        jobs,
        ..Default::default()
    };
    let config = deploy_config();

    let deployment = DeploymentQuery::new(&config, &tracker)
        .find_last("g/app")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(deployment.pipeline.id, 8);
}

#[tokio::test]
async fn test_job_name_match_is_case_insensitive() {
    let mut jobs = HashMap::new();
    // Stage does not match; the configured job name does.
    jobs.insert(9, vec![job(91, "Ship-It", "release", "success")]);
    let tracker = StubTracker {
        pipelines: vec![pipeline(9, "ffffffffaaaa")],
        jobs,
        ..Default::default()
    };
    let config = config(
        r#"
        deploy_ref = "main"

        [deployments."g/app"]
        stage = "deploy"
        job = "ship-it"
        "#,
    );

    let deployment = DeploymentQuery::new(&config, &tracker)
        .find_last("g/app")
        .await
        .unwrap();
    assert!(deployment.is_some());
}

#[tokio::test]
async fn test_no_mapping_yields_empty_result() {
    let tracker = StubTracker {
        pipelines: vec![pipeline(9, "ffffffffaaaa")],
        ..Default::default()
    };
    let config = config("deploy_ref = \"main\"");

    let deployment = DeploymentQuery::new(&config, &tracker)
        .find_last("g/app")
        .await
        .unwrap();
    assert!(deployment.is_none());
}

#[tokio::test]
async fn test_no_successful_match_yields_empty_result() {
    let mut jobs = HashMap::new();
    jobs.insert(9, vec![job(91, "lint", "test", "success")]);
    let tracker = StubTracker {
        pipelines: vec![pipeline(9, "ffffffffaaaa")],
        jobs,
        ..Default::default()
    };
    let config = deploy_config();

    let deployment = DeploymentQuery::new(&config, &tracker)
        .find_last("g/app")
        .await
        .unwrap();
    assert!(deployment.is_none());
}

#[tokio::test]
async fn test_ref_falls_back_to_project_default_branch() {
    let tracker = StubTracker {
        default_branch: Some("trunk".into()),
        ..Default::default()
    };
    let config = config(
        r#"
        [deployments."g/app"]
        stage = "deploy"
        "#,
    );

    DeploymentQuery::new(&config, &tracker)
        .find_last("g/app")
        .await
        .unwrap();
    assert_eq!(*tracker.pipeline_refs.lock().unwrap(), vec!["trunk".to_string()]);
}

#[tokio::test]
async fn test_ref_falls_back_to_master_without_default_branch() {
    let tracker = StubTracker::default();
    let config = config(
        r#"
        [deployments."g/app"]
        stage = "deploy"
        "#,
    );

    DeploymentQuery::new(&config, &tracker)
        .find_last("g/app")
        .await
        .unwrap();
    assert_eq!(
        *tracker.pipeline_refs.lock().unwrap(),
        vec!["master".to_string()]
    );
}
