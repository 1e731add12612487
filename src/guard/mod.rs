//! Route guard for browser page requests.
//!
//! Pages are gated on the presence of a session cookie; API routes answer
//! for themselves with status codes, and static assets plus the sign-in
//! surface are never intercepted at all.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::debug;

use crate::api::AppContext;

pub const SIGN_IN_PATH: &str = "/auth/sign-in";

const API_PREFIX: &str = "/api";

/// Outcome of guarding a single intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Let the request through to its handler.
    Allow,
    /// Send the browser to the sign-in page.
    Redirect,
}

/// Whether the guard runs for this path at all.
///
/// Static assets stay out so stylesheets and images load on the sign-in
/// page itself, and the auth surface stays out to avoid redirect loops.
#[must_use]
pub fn intercepts(path: &str) -> bool {
    if path.starts_with("/assets/") || path.starts_with("/images/") || path == "/favicon.ico" {
        return false;
    }
    if path.starts_with("/auth/") {
        return false;
    }
    if path == "/health" || path.starts_with("/swagger-ui") || path.starts_with("/api-docs") {
        return false;
    }
    true
}

/// Decide an intercepted request.
///
/// API routes are allowed through without consulting the session; their
/// handlers reply with 401 rather than a redirect. For everything else the
/// session lookup runs exactly once.
pub fn evaluate(path: &str, has_session: impl FnOnce() -> bool) -> RouteDecision {
    if path.starts_with(API_PREFIX) {
        return RouteDecision::Allow;
    }

    if has_session() {
        RouteDecision::Allow
    } else {
        RouteDecision::Redirect
    }
}

/// Axum middleware wrapping [`intercepts`] and [`evaluate`] around the
/// router. A session counts as present when the cookie verifies, even if
/// the record inside carries a refresh error; the page still renders and
/// surfaces the error to the client.
pub async fn intercept(
    State(ctx): State<Arc<AppContext>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if !intercepts(path) {
        return next.run(request).await;
    }

    let decision = evaluate(path, || ctx.sessions.load(request.headers()).is_some());
    match decision {
        RouteDecision::Allow => next.run(request).await,
        RouteDecision::Redirect => {
            debug!(path, "No session, redirecting to sign-in");
            Redirect::to(SIGN_IN_PATH).into_response()
        }
    }
}
