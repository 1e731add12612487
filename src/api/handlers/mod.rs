pub mod assistants;
pub mod console;
pub mod health;
pub mod indexes;
pub mod session;
pub mod sign_in;
pub mod tools;

// common functions for the handlers
use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::upstream::UpstreamError;

/// Error payload shared by every API route.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub(crate) fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// 401 with the body API clients key their sign-in prompt on.
pub(crate) fn missing_token() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody::new("No access token provided")),
    )
        .into_response()
}

/// Any upstream failure becomes a 500 carrying the failure message; the
/// upstream's own status is logged but not forwarded.
pub(crate) fn upstream_failure(err: &UpstreamError) -> Response {
    error!("Upstream request failed: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new(err.to_string())),
    )
        .into_response()
}
