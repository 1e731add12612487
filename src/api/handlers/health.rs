use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::GIT_COMMIT_HASH;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
}

/// `X-App` value advertised on every health response, `name:version:shortcommit`.
fn x_app_header() -> Option<HeaderValue> {
    let short_commit = GIT_COMMIT_HASH.get(..7).unwrap_or("");
    let banner = format!(
        "{}:{}:{short_commit}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    match banner.parse::<HeaderValue>() {
        Ok(value) => Some(value),
        Err(err) => {
            error!("Failed to build X-App header: {}", err);

            None
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = [Health])
    ),
    tag = "health"
)]
// axum handler for health
pub async fn health(method: Method) -> impl IntoResponse {
    let mut headers = HeaderMap::new();

    if let Some(value) = x_app_header() {
        debug!("X-App header: {:?}", value);

        headers.insert("X-App", value);
    }

    let report = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    // OPTIONS preflights get the headers but no body
    let body = if method == Method::GET {
        Json(report).into_response()
    } else {
        Body::empty().into_response()
    };

    (StatusCode::OK, headers, body)
}
