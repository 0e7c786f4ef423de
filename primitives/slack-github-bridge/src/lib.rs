//! Slack to GitHub Actions bridge.
//!
//! Receives Slack slash commands carrying eight daily counts and forwards
//! them to a GitHub Actions workflow through `workflow_dispatch`.
//!
//! A command such as `/grind 1 0 0 2 0 0 1 1` (Talks, IG, TT, HT, Coffee,
//! Blog, Run, Gym) starts `slack_response.yml` on `main` with
//! `inputs.metrics = "1 0 0 2 0 0 1 1"`. The bridge keeps no state; the
//! workflow owns everything that happens next.
//!
//! # Responses
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | Non-POST method | 405 | `Method not allowed` |
//! | Unknown content type | 400 | `Unsupported content type` |
//! | Failed Slack verification | 401 | plain-text reason |
//! | Anything else | 200 | `{"text": "..."}` Slack message |

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod metrics;
pub mod reply;
pub mod verify;

pub use command::{CommandRecord, ContentKind};
pub use config::{Args, BridgeConfig};
pub use dispatch::{DispatchResult, DispatchSetupError, WorkflowDispatcher};
pub use error::{AuthFailure, BridgeError};
pub use handler::{BridgeState, handle_command, router};
pub use metrics::{Metric, MetricVector, parse_metrics};
pub use reply::SlackReply;
