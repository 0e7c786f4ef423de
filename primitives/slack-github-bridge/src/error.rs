//! Request failures and their HTTP mapping.
//!
//! Only the gates in front of the pipeline answer with a non-200 status.
//! Anything that goes wrong after them is still rendered as a Slack message
//! so the user sees it in the channel.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::reply::SlackReply;

/// Why a request was not allowed through the verification gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("Invalid verification token")]
    InvalidToken,

    #[error("Missing signature")]
    MissingSignature,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Stale request timestamp")]
    StaleTimestamp,
}

/// Errors raised while handling one slash command.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Unsupported content type")]
    UnsupportedContentType,

    #[error("{0}")]
    Unauthorized(AuthFailure),

    /// The body matched its content type but could not be decoded.
    #[error("{0}")]
    MalformedBody(String),
}

impl From<AuthFailure> for BridgeError {
    fn from(failure: AuthFailure) -> Self {
        Self::Unauthorized(failure)
    }
}

impl BridgeError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::UnsupportedContentType => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::MalformedBody(_) => StatusCode::OK,
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        match self {
            Self::MalformedBody(message) => SlackReply::error(&message).into_response(),
            other => (other.status(), other.to_string()).into_response(),
        }
    }
}
