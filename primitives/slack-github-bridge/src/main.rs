//! Slack GitHub Bridge - Slash Command Receiver
//!
//! Receives Slack slash commands, parses eight metric counts from the text
//! and triggers the `slack_response.yml` GitHub Actions workflow with them.
//!
//! # Usage
//!
//! ```bash
//! # Required settings
//! export GITHUB_TOKEN=ghp_xxx GITHUB_OWNER=octo GITHUB_REPO=grind
//!
//! # Start with default settings (port 8080, path /)
//! slack-github-bridge
//!
//! # Custom port and path, with Slack verification
//! slack-github-bridge --port 3000 --path /slack/grind \
//!     --slack-verification-token my-token
//! ```

use anyhow::Context;
use clap::Parser;
use slack_github_bridge::{Args, BridgeConfig, router};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = BridgeConfig::from(&args);

    if config.verification_token().is_none() && config.signing_secret().is_none() {
        warn!("no Slack verification configured; every request will be accepted");
    }

    let app = router(config, &args.path).context("failed to build router")?;

    let addr = args
        .socket_addr()
        .with_context(|| format!("invalid listen address {}:{}", args.host, args.port))?;

    // Set up SIGTERM handler for graceful shutdown
    let mut sigterm = signal(SignalKind::terminate())?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, path = %args.path, "listening for slash commands");

    let server = axum::serve(listener, app.into_make_service());

    tokio::select! {
        result = server => {
            result?;
        }
        _ = sigterm.recv() => {
            info!("received SIGTERM, shutting down");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("received Ctrl-C, shutting down");
        }
    }

    Ok(())
}
