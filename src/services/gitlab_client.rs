//! GitLab API client.
//!
//! HTTP implementation of the [`Tracker`] boundary against GitLab API v4,
//! with PRIVATE-TOKEN authentication and structured error reporting.

use crate::error::AppError;
use crate::models::{
    Branch, DiffRefs, Epic, GitLabProject, GitLabUser, Issue, Iteration, Job, Label, Member,
    MergeRequest, MergeRequestUpdate, Milestone, NewIssue, NewMergeRequest, Pipeline,
};
use crate::services::tracker::Tracker;
use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// GitLab API client configuration.
#[derive(Debug, Clone)]
pub struct GitLabClientConfig {
    /// Base URL of the GitLab instance (e.g., `https://gitlab.com`).
    pub base_url: String,

    /// Personal access token for authentication.
    pub token: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GitLabClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: String::new(),
            timeout_secs: 30,
        }
    }
}

/// GitLab API client.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    client: Client,
    config: GitLabClientConfig,
}

impl GitLabClient {
    /// Create a new GitLab client.
    pub fn new(config: GitLabClientConfig) -> Result<Self, AppError> {
        let mut headers = header::HeaderMap::new();

        let token_value = header::HeaderValue::from_str(&config.token)
            .map_err(|_| AppError::authentication("Invalid token format"))?;
        headers.insert("PRIVATE-TOKEN", token_value);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Get the base URL for API requests.
    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/api/v4{}",
            self.config.base_url.trim_end_matches('/'),
            path
        )
    }

    /// Handle API response errors.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        endpoint: &str,
    ) -> Result<T, AppError> {
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| AppError::internal(format!("Failed to parse response: {}", e)))
        } else if status == StatusCode::UNAUTHORIZED {
            Err(AppError::authentication(
                "GitLab token expired or revoked. Please re-authenticate.",
            ))
        } else {
            let status_code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            let body_message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| {
                    // GitLab returns errors as {"message": "..."} or {"error": "..."}
                    v.get("message").or_else(|| v.get("error")).map(|m| {
                        if let Some(s) = m.as_str() {
                            s.to_string()
                        } else {
                            // Sometimes "message" is an object like {"base":["msg"]}
                            m.to_string()
                        }
                    })
                });

            let message = match (status, &body_message) {
                (StatusCode::FORBIDDEN, _) => "Access denied".to_string(),
                (StatusCode::NOT_FOUND, _) => "Resource not found".to_string(),
                (StatusCode::TOO_MANY_REQUESTS, _) => "Rate limit exceeded".to_string(),
                (_, Some(msg)) => msg.clone(),
                _ => format!("Request failed ({}): {}", status_code, body),
            };

            Err(AppError::gitlab_api_full(message, status_code, endpoint))
        }
    }

    /// GET a JSON endpoint with optional query parameters.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Option<&impl Serialize>,
    ) -> Result<T, AppError> {
        let url = self.api_url(endpoint);
        let mut request = self.client.get(&url);
        if let Some(q) = query {
            request = request.query(q);
        }
        let response = request.send().await?;
        self.handle_response(response, endpoint).await
    }

    /// POST a JSON body and parse the JSON response.
    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let url = self.api_url(endpoint);
        let response = self.client.post(&url).json(body).send().await?;
        self.handle_response(response, endpoint).await
    }

    /// POST a JSON body, expecting only a success status back.
    async fn post_empty<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<(), AppError> {
        let url = self.api_url(endpoint);
        let response = self.client.post(&url).json(body).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            Err(AppError::gitlab_api_full(
                format!("Request failed: {}", text),
                status,
                endpoint,
            ))
        }
    }

    /// URL path segment for a project id or path.
    fn project_segment(project: &str) -> String {
        urlencoding::encode(project).into_owned()
    }
}

#[async_trait]
impl Tracker for GitLabClient {
    async fn get_user(&self) -> Result<GitLabUser, AppError> {
        self.get_json("/user", None::<&()>).await
    }

    async fn get_project(&self, project: &str) -> Result<GitLabProject, AppError> {
        let endpoint = format!("/projects/{}", Self::project_segment(project));
        self.get_json(&endpoint, None::<&()>).await
    }

    async fn create_issue(&self, project: &str, issue: &NewIssue) -> Result<Issue, AppError> {
        let endpoint = format!("/projects/{}/issues", Self::project_segment(project));
        self.post_json(&endpoint, issue).await
    }

    async fn create_branch(
        &self,
        project: &str,
        branch: &str,
        base_ref: &str,
        issue_iid: i64,
    ) -> Result<Branch, AppError> {
        let endpoint = format!(
            "/projects/{}/repository/branches",
            Self::project_segment(project)
        );
        let body = serde_json::json!({
            "branch": branch,
            "ref": base_ref,
            "issue_iid": issue_iid,
        });
        self.post_json(&endpoint, &body).await
    }

    async fn create_merge_request(
        &self,
        project: &str,
        mr: &NewMergeRequest,
    ) -> Result<MergeRequest, AppError> {
        let endpoint = format!("/projects/{}/merge_requests", Self::project_segment(project));
        self.post_json(&endpoint, mr).await
    }

    async fn update_merge_request(
        &self,
        project: &str,
        mr_iid: i64,
        update: &MergeRequestUpdate,
    ) -> Result<MergeRequest, AppError> {
        let endpoint = format!(
            "/projects/{}/merge_requests/{}",
            Self::project_segment(project),
            mr_iid
        );
        let url = self.api_url(&endpoint);
        let response = self.client.put(&url).json(update).send().await?;
        self.handle_response(response, &endpoint).await
    }

    async fn list_milestones(&self, group: &str) -> Result<Vec<Milestone>, AppError> {
        let endpoint = format!("/groups/{}/milestones", Self::project_segment(group));
        self.get_json(&endpoint, Some(&[("state", "active"), ("per_page", "100")]))
            .await
    }

    async fn list_iterations(&self, group: &str) -> Result<Vec<Iteration>, AppError> {
        let endpoint = format!("/groups/{}/iterations", Self::project_segment(group));
        self.get_json(&endpoint, Some(&[("state", "opened"), ("per_page", "100")]))
            .await
    }

    async fn list_epics(&self, group: &str) -> Result<Vec<Epic>, AppError> {
        let endpoint = format!("/groups/{}/epics", Self::project_segment(group));
        self.get_json(&endpoint, Some(&[("state", "opened"), ("per_page", "100")]))
            .await
    }

    async fn list_labels(&self, project: &str) -> Result<Vec<Label>, AppError> {
        let endpoint = format!("/projects/{}/labels", Self::project_segment(project));
        self.get_json(&endpoint, Some(&[("per_page", "100")])).await
    }

    async fn list_members(&self, project: &str) -> Result<Vec<Member>, AppError> {
        let endpoint = format!("/projects/{}/members/all", Self::project_segment(project));
        self.get_json(&endpoint, Some(&[("per_page", "100")])).await
    }

    async fn find_merge_request(
        &self,
        project: &str,
        source_branch: &str,
    ) -> Result<Option<MergeRequest>, AppError> {
        let endpoint = format!("/projects/{}/merge_requests", Self::project_segment(project));
        let matches: Vec<MergeRequest> = self
            .get_json(
                &endpoint,
                Some(&[("source_branch", source_branch), ("state", "opened")]),
            )
            .await?;
        Ok(matches.into_iter().next())
    }

    async fn get_diff_refs(&self, project: &str, mr_iid: i64) -> Result<DiffRefs, AppError> {
        let endpoint = format!(
            "/projects/{}/merge_requests/{}",
            Self::project_segment(project),
            mr_iid
        );
        let mr: MergeRequest = self.get_json(&endpoint, None::<&()>).await?;
        Ok(mr.diff_refs.unwrap_or_default())
    }

    async fn post_note(&self, project: &str, mr_iid: i64, body: &str) -> Result<(), AppError> {
        let endpoint = format!(
            "/projects/{}/merge_requests/{}/notes",
            Self::project_segment(project),
            mr_iid
        );
        self.post_empty(&endpoint, &serde_json::json!({ "body": body }))
            .await
    }

    async fn post_inline_comment(
        &self,
        project: &str,
        mr_iid: i64,
        body: &str,
        new_path: &str,
        new_line: i64,
        refs: &DiffRefs,
    ) -> Result<(), AppError> {
        let endpoint = format!(
            "/projects/{}/merge_requests/{}/discussions",
            Self::project_segment(project),
            mr_iid
        );

        #[derive(Serialize)]
        struct Position<'a> {
            base_sha: &'a str,
            head_sha: &'a str,
            start_sha: &'a str,
            position_type: &'a str,
            new_path: &'a str,
            new_line: i64,
        }

        #[derive(Serialize)]
        struct Body<'a> {
            body: &'a str,
            position: Position<'a>,
        }

        // Callers check completeness before attempting inline delivery.
        let (base_sha, head_sha, start_sha) = match (&refs.base_sha, &refs.head_sha, &refs.start_sha)
        {
            (Some(base), Some(head), Some(start)) => (base, head, start),
            _ => {
                return Err(AppError::invalid_input(
                    "inline comment requires complete diff refs",
                ))
            }
        };

        let request_body = Body {
            body,
            position: Position {
                base_sha,
                head_sha,
                start_sha,
                position_type: "text",
                new_path,
                new_line,
            },
        };

        self.post_empty(&endpoint, &request_body).await
    }

    async fn merge_when_pipeline_succeeds(
        &self,
        project: &str,
        mr_iid: i64,
    ) -> Result<(), AppError> {
        let endpoint = format!(
            "/projects/{}/merge_requests/{}/merge",
            Self::project_segment(project),
            mr_iid
        );
        let url = self.api_url(&endpoint);
        let response = self
            .client
            .put(&url)
            .json(&serde_json::json!({ "merge_when_pipeline_succeeds": true }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message")?.as_str().map(String::from))
                .unwrap_or_else(|| match status.as_u16() {
                    405 => "MR cannot be merged (check conflicts or pipeline)".into(),
                    406 => "Branch cannot be merged".into(),
                    _ => format!("Merge failed ({})", status),
                });
            Err(AppError::gitlab_api_full(message, status.as_u16(), &endpoint))
        }
    }

    async fn add_spent_time(
        &self,
        project: &str,
        issue_iid: i64,
        duration: &str,
    ) -> Result<(), AppError> {
        let endpoint = format!(
            "/projects/{}/issues/{}/add_spent_time",
            Self::project_segment(project),
            issue_iid
        );
        let url = self.api_url(&endpoint);
        let response = self
            .client
            .post(&url)
            .query(&[("duration", duration)])
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AppError::gitlab_api_full(
                "Failed to record spent time",
                response.status().as_u16(),
                &endpoint,
            ))
        }
    }

    async fn get_pipelines(
        &self,
        project: &str,
        ref_name: &str,
        limit: u32,
    ) -> Result<Vec<Pipeline>, AppError> {
        let endpoint = format!("/projects/{}/pipelines", Self::project_segment(project));
        self.get_json(
            &endpoint,
            Some(&[
                ("ref", ref_name.to_string()),
                ("order_by", "updated_at".to_string()),
                ("sort", "desc".to_string()),
                ("per_page", limit.to_string()),
            ]),
        )
        .await
    }

    async fn get_pipeline_jobs(
        &self,
        project: &str,
        pipeline_id: i64,
    ) -> Result<Vec<Job>, AppError> {
        let endpoint = format!(
            "/projects/{}/pipelines/{}/jobs",
            Self::project_segment(project),
            pipeline_id
        );
        self.get_json(&endpoint, Some(&[("per_page", "100")])).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_construction() {
        let client = GitLabClient::new(GitLabClientConfig {
            base_url: "https://gitlab.com/".to_string(),
            token: "test-token".to_string(),
            timeout_secs: 30,
        })
        .unwrap();
        assert_eq!(client.api_url("/user"), "https://gitlab.com/api/v4/user");
    }

    #[test]
    fn test_project_segment_encodes_paths() {
        assert_eq!(GitLabClient::project_segment("group/app"), "group%2Fapp");
        assert_eq!(GitLabClient::project_segment("12345"), "12345");
    }

    #[test]
    fn test_invalid_token_rejected() {
        let result = GitLabClient::new(GitLabClientConfig {
            base_url: "https://gitlab.com".to_string(),
            token: "bad\ntoken".to_string(),
            timeout_secs: 30,
        });
        assert!(matches!(result, Err(AppError::Authentication { .. })));
    }
}
