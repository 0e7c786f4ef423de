//! Slack message bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::metrics::{MetricVector, metric_labels};

/// Example shown in the usage hint.
pub const EXAMPLE_COMMAND: &str = "1 0 0 2 0 0 1 1";

/// A chat message posted back in the invoking channel. Always sent as 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackReply {
    pub text: String,
}

impl SlackReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The text held no valid metric vector.
    pub fn usage() -> Self {
        Self::new(format!(
            "❌ Invalid format. Please use: `{EXAMPLE_COMMAND}`\n({})",
            metric_labels()
        ))
    }

    pub fn dispatched(metrics: &MetricVector) -> Self {
        Self::new(format!(
            "✅ Workflow triggered successfully!\n📊 Metrics: `{metrics}`\nCheck GitHub Actions for progress."
        ))
    }

    pub fn dispatch_failed(reason: &str) -> Self {
        Self::new(format!("❌ Failed to trigger workflow: {reason}"))
    }

    pub fn error(message: &str) -> Self {
        Self::new(format!("❌ Error: {message}"))
    }
}

impl IntoResponse for SlackReply {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
