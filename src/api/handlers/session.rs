//! Session view endpoint backing the console's auth state.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::{
    api::AppContext,
    session::{self, trigger::ReauthTrigger, SessionError},
};

/// What the client sees for one render of the session. `reauthenticate` is
/// true exactly once per failure, on the render where the refresh first
/// failed; later renders of the same failed session report false.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub access_token: Option<String>,
    pub error: Option<SessionError>,
    pub reauthenticate: bool,
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No session cookie")
    ),
    tag = "auth"
)]
pub async fn session(headers: HeaderMap, ctx: Extension<Arc<AppContext>>) -> impl IntoResponse {
    // Missing cookies are treated as "no session" to avoid leaking auth state.
    let Some(record) = ctx.sessions.load(&headers) else {
        return StatusCode::NO_CONTENT.into_response();
    };

    // Seed the trigger with the state the client last saw, then compare it
    // against the state after materializing.
    let mut trigger = ReauthTrigger::new();
    trigger.observe(record.error);

    let materialized = session::materialize(&ctx.idp, record, None).await;
    let reauthenticate = trigger.observe(materialized.error);

    let mut response_headers = HeaderMap::new();
    match ctx
        .sessions
        .save(&materialized)
        .and_then(|cookie| HeaderValue::from_str(&cookie).map_err(anyhow::Error::from))
    {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to persist session cookie: {err:#}"),
    }

    let view = materialized.view();
    let response = SessionResponse {
        access_token: view.access_token,
        error: view.error,
        reauthenticate,
    };

    (StatusCode::OK, response_headers, Json(response)).into_response()
}
