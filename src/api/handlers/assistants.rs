//! Assistant proxy routes. Every route forwards the caller's bearer token to
//! the upstream and never consults the session cookie.

use axum::{
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use super::{extract_bearer_token, missing_token, upstream_failure, ErrorBody};
use crate::{api::AppContext, upstream::AssistantConfig};

#[utoipa::path(
    get,
    path = "/api/assistants",
    responses(
        (status = 200, description = "Assistant names", body = [String]),
        (status = 401, description = "No bearer token", body = ErrorBody),
        (status = 500, description = "Upstream failure", body = ErrorBody)
    ),
    tag = "assistants"
)]
pub async fn list(headers: HeaderMap, ctx: Extension<Arc<AppContext>>) -> Response {
    let Some(token) = extract_bearer_token(&headers) else {
        return missing_token();
    };

    match ctx.upstream.list_assistants(&token).await {
        Ok(names) => Json(names).into_response(),
        Err(err) => upstream_failure(&err),
    }
}

#[utoipa::path(
    post,
    path = "/api/assistants",
    request_body = AssistantConfig,
    responses(
        (status = 200, description = "Assistant stored"),
        (status = 400, description = "Missing or invalid payload", body = ErrorBody),
        (status = 401, description = "No bearer token", body = ErrorBody),
        (status = 500, description = "Upstream failure", body = ErrorBody)
    ),
    tag = "assistants"
)]
pub async fn upsert(
    headers: HeaderMap,
    ctx: Extension<Arc<AppContext>>,
    payload: Option<Json<AssistantConfig>>,
) -> Response {
    let Some(token) = extract_bearer_token(&headers) else {
        return missing_token();
    };

    let Some(Json(config)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Missing payload")),
        )
            .into_response();
    };

    if let Err(problems) = config.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new(problems.join("; "))),
        )
            .into_response();
    }

    match ctx.upstream.upsert_assistant(&token, &config).await {
        Ok(ack) => Json(ack).into_response(),
        Err(err) => upstream_failure(&err),
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AssistantQuery {
    /// Name of the assistant to fetch.
    name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/assistant",
    params(AssistantQuery),
    responses(
        (status = 200, description = "Assistant definition"),
        (status = 400, description = "Missing name parameter", body = ErrorBody),
        (status = 401, description = "No bearer token", body = ErrorBody),
        (status = 500, description = "Upstream failure", body = ErrorBody)
    ),
    tag = "assistants"
)]
pub async fn by_name(
    headers: HeaderMap,
    ctx: Extension<Arc<AppContext>>,
    Query(query): Query<AssistantQuery>,
) -> Response {
    let Some(token) = extract_bearer_token(&headers) else {
        return missing_token();
    };

    let Some(name) = query
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Missing name parameter")),
        )
            .into_response();
    };

    match ctx.upstream.assistant(&token, name).await {
        Ok(assistant) => Json(assistant).into_response(),
        Err(err) => upstream_failure(&err),
    }
}
