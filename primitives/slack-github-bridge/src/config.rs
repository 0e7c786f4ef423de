//! Startup configuration.
//!
//! Every setting is a command-line flag backed by an environment variable.
//! [`Args`] is parsed once in `main` and frozen into a [`BridgeConfig`],
//! which is the only configuration the request pipeline ever sees.

use clap::Parser;
use std::{fmt, net::SocketAddr};

/// Public GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Slack slash-command receiver that dispatches a GitHub Actions workflow.
#[derive(Parser, Debug, Clone)]
#[command(name = "slack-github-bridge")]
#[command(about = "Receives Slack slash commands and dispatches GitHub workflows")]
pub struct Args {
    /// GitHub token with `repo` and `workflow` scopes.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: String,

    /// Owner of the repository hosting the workflow.
    #[arg(long, env = "GITHUB_OWNER")]
    pub github_owner: String,

    /// Repository hosting the workflow.
    #[arg(long, env = "GITHUB_REPO")]
    pub github_repo: String,

    /// GitHub API base URL.
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub github_api_url: String,

    /// Slack verification token. Requests must carry it when set.
    #[arg(long, env = "SLACK_VERIFICATION_TOKEN", hide_env_values = true)]
    pub slack_verification_token: Option<String>,

    /// Slack signing secret. Requests must carry a valid v0 signature when set.
    #[arg(long, env = "SLACK_SIGNING_SECRET", hide_env_values = true)]
    pub slack_signing_secret: Option<String>,

    /// Port to listen on.
    #[arg(short, long, env = "BRIDGE_PORT", default_value = "8080")]
    pub port: u16,

    /// Host to bind to.
    #[arg(long, env = "BRIDGE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Path to accept slash commands on.
    #[arg(long, env = "BRIDGE_PATH", default_value = "/")]
    pub path: String,
}

impl Args {
    /// Listener address built from `host` and `port`.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Immutable settings shared by every request.
#[derive(Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub github_token: String,
    pub github_owner: String,
    pub github_repo: String,
    pub github_api_url: String,
    pub slack_verification_token: Option<String>,
    pub slack_signing_secret: Option<String>,
}

impl BridgeConfig {
    /// Config against the public API with both Slack checks disabled.
    pub fn new(
        github_token: impl Into<String>,
        github_owner: impl Into<String>,
        github_repo: impl Into<String>,
    ) -> Self {
        Self {
            github_token: github_token.into(),
            github_owner: github_owner.into(),
            github_repo: github_repo.into(),
            github_api_url: DEFAULT_API_URL.to_string(),
            slack_verification_token: None,
            slack_signing_secret: None,
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.github_api_url = url.into();
        self
    }

    pub fn with_verification_token(mut self, token: impl Into<String>) -> Self {
        self.slack_verification_token = Some(token.into());
        self
    }

    pub fn with_signing_secret(mut self, secret: impl Into<String>) -> Self {
        self.slack_signing_secret = Some(secret.into());
        self
    }

    /// The verification token, if one is configured. Empty counts as unset.
    pub fn verification_token(&self) -> Option<&str> {
        non_empty(self.slack_verification_token.as_deref())
    }

    /// The signing secret, if one is configured. Empty counts as unset.
    pub fn signing_secret(&self) -> Option<&str> {
        non_empty(self.slack_signing_secret.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl From<&Args> for BridgeConfig {
    fn from(args: &Args) -> Self {
        Self {
            github_token: args.github_token.clone(),
            github_owner: args.github_owner.clone(),
            github_repo: args.github_repo.clone(),
            github_api_url: args.github_api_url.clone(),
            slack_verification_token: args.slack_verification_token.clone(),
            slack_signing_secret: args.slack_signing_secret.clone(),
        }
    }
}

// Tokens stay out of logs.
impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("BridgeConfig")
            .field("github_token", &"<redacted>")
            .field("github_owner", &self.github_owner)
            .field("github_repo", &self.github_repo)
            .field("github_api_url", &self.github_api_url)
            .field("slack_verification_token", &redact(&self.slack_verification_token))
            .field("slack_signing_secret", &redact(&self.slack_signing_secret))
            .finish()
    }
}
