//! The slash-command pipeline and its router.
//!
//! `method → content type → body → signature → decode → token → parse →
//! dispatch`, strictly in that order. Each step either hands its output to the next or
//! ends the request.

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::State,
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
    routing::any,
};
use futures::FutureExt;
use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};
use tracing::{debug, error, info, warn};

use crate::{
    command::{self, ContentKind},
    config::BridgeConfig,
    dispatch::{DispatchResult, DispatchSetupError, WorkflowDispatcher},
    error::BridgeError,
    metrics,
    reply::SlackReply,
    verify,
};

/// Shared application state.
#[derive(Debug)]
pub struct BridgeState {
    config: BridgeConfig,
    dispatcher: WorkflowDispatcher,
}

impl BridgeState {
    pub fn new(config: BridgeConfig) -> Result<Self, DispatchSetupError> {
        let dispatcher = WorkflowDispatcher::new(&config)?;
        Ok(Self { config, dispatcher })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

/// Builds the router serving slash commands on `path`.
///
/// Every method is routed to the handler so that non-POST requests get the
/// bridge's own 405 body.
pub fn router(config: BridgeConfig, path: &str) -> Result<Router, DispatchSetupError> {
    let state = Arc::new(BridgeState::new(config)?);
    Ok(Router::new()
        .route(path, any(handle_request))
        .with_state(state))
}

/// Largest body read once a request is past the method and content-type gates.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Handles incoming HTTP requests.
///
/// The body is taken unread so the method and content-type gates answer
/// before any of it is buffered.
async fn handle_request(
    State(state): State<Arc<BridgeState>>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Response {
    respond(handle_command(&state, &method, &headers, body)).await
}

/// Renders a pipeline outcome, turning a panic into a Slack error message.
async fn respond<F>(pipeline: F) -> Response
where
    F: Future<Output = Result<SlackReply, BridgeError>>,
{
    match AssertUnwindSafe(pipeline).catch_unwind().await {
        Ok(Ok(reply)) => reply.into_response(),
        Ok(Err(e)) => {
            match &e {
                BridgeError::MalformedBody(reason) => {
                    error!(error = %reason, "failed to decode slash command")
                }
                other => warn!(status = other.status().as_u16(), error = %other, "request rejected"),
            }
            e.into_response()
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(error = %message, "slash command handler panicked");
            SlackReply::error(&message).into_response()
        }
    }
}

/// Runs one slash command through the whole pipeline.
///
/// `Ok` replies are always sent with status 200. `Err` carries the gate
/// that stopped the request; see [`BridgeError`] for its status.
pub async fn handle_command(
    state: &BridgeState,
    method: &Method,
    headers: &HeaderMap,
    body: Body,
) -> Result<SlackReply, BridgeError> {
    if *method != Method::POST {
        return Err(BridgeError::MethodNotAllowed);
    }

    let kind = ContentKind::from_headers(headers).ok_or(BridgeError::UnsupportedContentType)?;

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| BridgeError::MalformedBody(format!("failed to read request body: {e}")))?;

    if let Some(secret) = state.config.signing_secret() {
        verify::check_signature(secret, headers, &body, verify::unix_now())?;
    }

    let record = command::decode(kind, &body)?;
    verify::check_token(state.config.verification_token(), &record)?;

    debug!(
        user_name = record.user_name.as_deref().unwrap_or_default(),
        channel_name = record.channel_name.as_deref().unwrap_or_default(),
        "slash command accepted"
    );

    let Some(metrics) = metrics::parse_metrics(record.text()) else {
        info!(text = record.text(), "no metric vector in command text");
        return Ok(SlackReply::usage());
    };

    match state.dispatcher.dispatch(&metrics).await {
        DispatchResult::Success => Ok(SlackReply::dispatched(&metrics)),
        DispatchResult::Failure(reason) => Ok(SlackReply::dispatch_failed(&reason)),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "internal error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode, header::CONTENT_TYPE};

    fn state(config: BridgeConfig) -> BridgeState {
        BridgeState::new(config.with_api_url("http://127.0.0.1:9")).expect("state builds")
    }

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    #[tokio::test]
    async fn method_is_checked_before_content_type() {
        let state = state(BridgeConfig::new("t", "o", "r"));
        let result = handle_command(&state, &Method::GET, &HeaderMap::new(), Body::from("garbage")).await;
        assert!(matches!(result, Err(BridgeError::MethodNotAllowed)));
    }

    #[tokio::test]
    async fn unknown_content_type_is_rejected_before_decoding() {
        let state = state(BridgeConfig::new("t", "o", "r"));
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let body = Body::from(r#"{"text": "1 2 3 4 5 6 7 8"}"#);
        let result = handle_command(&state, &Method::POST, &headers, body).await;
        assert!(matches!(result, Err(BridgeError::UnsupportedContentType)));
    }

    #[tokio::test]
    async fn token_gate_runs_after_decoding() {
        let state = state(BridgeConfig::new("t", "o", "r").with_verification_token("s3cret"));
        let body = Body::from(r#"{"token": "wrong", "text": "1 2 3"}"#);

        let result = handle_command(&state, &Method::POST, &json_headers(), body).await;
        assert!(matches!(result, Err(BridgeError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn unparseable_text_yields_usage_hint() {
        let state = state(BridgeConfig::new("t", "o", "r"));
        let body = Body::from(r#"{"text": "1 2 3"}"#);

        let reply = handle_command(&state, &Method::POST, &json_headers(), body)
            .await
            .expect("usage hint is not an error");
        assert_eq!(reply, SlackReply::usage());
    }

    #[tokio::test]
    async fn oversized_body_is_reported_as_ok_error() {
        let state = state(BridgeConfig::new("t", "o", "r"));
        let body = Body::from(vec![b'1'; MAX_BODY_BYTES + 1]);

        let result = handle_command(&state, &Method::POST, &json_headers(), body).await;
        assert!(matches!(result, Err(BridgeError::MalformedBody(_))));
    }

    async fn exploding_pipeline() -> Result<SlackReply, BridgeError> {
        panic!("dispatcher exploded")
    }

    #[tokio::test]
    async fn panic_in_pipeline_becomes_ok_error_reply() {
        let response = respond(exploding_pipeline()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let reply: SlackReply = serde_json::from_slice(&bytes).expect("body is a Slack reply");
        assert_eq!(reply.text, "❌ Error: dispatcher exploded");
    }

    #[tokio::test]
    async fn gate_errors_keep_their_status_through_respond() {
        let response = respond(async { Err::<SlackReply, _>(BridgeError::MethodNotAllowed) }).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn panic_message_extracts_strings() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("kaboom"));
        assert_eq!(panic_message(boxed.as_ref()), "kaboom");

        let boxed: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(boxed.as_ref()), "internal error");
    }
}
