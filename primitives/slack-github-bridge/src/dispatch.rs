//! GitHub Actions `workflow_dispatch` client.
//!
//! One POST per command, no retries and no timeout beyond the client's
//! default. GitHub answers a successful dispatch with `204 No Content`;
//! anything else is reported back to the user verbatim.

use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, InvalidHeaderValue},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::{config::BridgeConfig, metrics::MetricVector};

/// Workflow file triggered for every command.
pub const WORKFLOW_FILE: &str = "slack_response.yml";

/// Git ref the workflow runs on.
pub const WORKFLOW_REF: &str = "main";

pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

pub const USER_AGENT: &str = "slack-github-bridge";

/// Outcome of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    Success,
    Failure(String),
}

/// Errors building the dispatcher at startup.
#[derive(Debug, Error)]
pub enum DispatchSetupError {
    #[error("GitHub token is not a valid header value")]
    InvalidToken(#[from] InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct DispatchRequest<'a> {
    #[serde(rename = "ref")]
    git_ref: &'a str,
    inputs: DispatchInputs<'a>,
}

#[derive(Debug, Serialize)]
struct DispatchInputs<'a> {
    metrics: &'a str,
}

/// Triggers the metrics workflow on the configured repository.
#[derive(Debug, Clone)]
pub struct WorkflowDispatcher {
    client: Client,
    url: String,
}

impl WorkflowDispatcher {
    pub fn new(config: &BridgeConfig) -> Result<Self, DispatchSetupError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.github_token))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            url: dispatch_url(config),
        })
    }

    /// The endpoint this dispatcher posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Starts a workflow run with `metrics` as its `metrics` input.
    pub async fn dispatch(&self, metrics: &MetricVector) -> DispatchResult {
        let rendered = metrics.to_string();
        let payload = DispatchRequest {
            git_ref: WORKFLOW_REF,
            inputs: DispatchInputs { metrics: &rendered },
        };

        let response = match self.client.post(&self.url).json(&payload).send().await {
            Ok(r) => r,
            Err(e) => {
                let reason = error_chain(e);
                warn!(error = %reason, "workflow dispatch request failed");
                return DispatchResult::Failure(reason);
            }
        };

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            info!(metrics = %rendered, "workflow dispatched");
            return DispatchResult::Success;
        }

        let body = response.text().await.map_err(error_chain);
        if let Err(e) = &body {
            warn!(status = status.as_u16(), error = %e, "failed to read dispatch response");
        } else {
            warn!(status = status.as_u16(), "workflow dispatch rejected");
        }
        DispatchResult::Failure(rejection_reason(status, body))
    }
}

/// `GitHub API returned <status>: <body>`, with the read error standing in
/// for a body that could not be read.
fn rejection_reason(status: StatusCode, body: Result<String, String>) -> String {
    let detail = body.unwrap_or_else(|e| e);
    format!("GitHub API returned {}: {detail}", status.as_u16())
}

// reqwest's message stops at "error sending request"; the cause is in the source chain.
fn error_chain(e: reqwest::Error) -> String {
    format!("{:#}", anyhow::Error::from(e))
}

fn dispatch_url(config: &BridgeConfig) -> String {
    format!(
        "{}/repos/{}/{}/actions/workflows/{WORKFLOW_FILE}/dispatches",
        config.github_api_url.trim_end_matches('/'),
        config.github_owner,
        config.github_repo,
    )
}
