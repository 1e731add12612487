//! Interactive sign-in: authorization redirect, callback, sign-out.

use axum::{
    extract::{Extension, Query},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::ErrorBody;
use crate::{
    api::AppContext,
    guard::SIGN_IN_PATH,
    session::{self, SessionTokenRecord},
};

/// Start a sign-in: remember the PKCE state and send the browser to the
/// identity provider.
pub async fn sign_in(ctx: Extension<Arc<AppContext>>) -> Response {
    let challenge = ctx.flow.begin();

    match ctx
        .idp
        .authorize_url(&ctx.redirect_uri(), &challenge.state, &challenge.code_challenge)
    {
        Ok(url) => Redirect::to(url.as_str()).into_response(),
        Err(err) => {
            error!("Failed to build authorize URL: {err:#}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Complete a sign-in from the provider's redirect back.
pub async fn callback(
    ctx: Extension<Arc<AppContext>>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(code) = query.error {
        let description = query.error_description.unwrap_or_default();
        warn!("Sign-in rejected by identity provider: {code} {description}");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new(format!("Sign-in rejected: {code}"))),
        )
            .into_response();
    }

    let (Some(code), Some(state)) = (query.code, query.state) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Missing code or state")),
        )
            .into_response();
    };

    // Replayed, expired, or unknown states all land here.
    let Some(verifier) = ctx.flow.complete(&state) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Invalid or expired state")),
        )
            .into_response();
    };

    match ctx
        .idp
        .exchange_code(&code, &verifier, &ctx.redirect_uri())
        .await
    {
        Ok(tokens) => {
            let record =
                session::materialize(&ctx.idp, SessionTokenRecord::default(), Some(tokens)).await;

            let mut headers = HeaderMap::new();
            match ctx
                .sessions
                .save(&record)
                .and_then(|cookie| HeaderValue::from_str(&cookie).map_err(anyhow::Error::from))
            {
                Ok(cookie) => {
                    headers.insert(SET_COOKIE, cookie);
                }
                Err(err) => {
                    error!("Failed to persist session cookie: {err:#}");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            }

            info!("Sign-in completed");
            (headers, Redirect::to("/")).into_response()
        }
        Err(err) => {
            error!("Code exchange failed: {err:#}");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody::new("Sign-in failed")),
            )
                .into_response()
        }
    }
}

/// Clear the session cookie and send the browser back to sign-in.
///
/// Always clears, even when no session was present.
pub async fn sign_out(ctx: Extension<Arc<AppContext>>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = HeaderValue::from_str(&ctx.sessions.clear()) {
        headers.insert(SET_COOKIE, cookie);
    }

    (headers, Redirect::to(SIGN_IN_PATH))
}
