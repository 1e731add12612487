use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::{extract_bearer_token, missing_token, upstream_failure, ErrorBody};
use crate::api::AppContext;

#[utoipa::path(
    get,
    path = "/api/indexes",
    responses(
        (status = 200, description = "Index name and description pairs", body = [Vec<String>]),
        (status = 401, description = "No bearer token", body = ErrorBody),
        (status = 500, description = "Upstream failure", body = ErrorBody)
    ),
    tag = "catalog"
)]
pub async fn list(headers: HeaderMap, ctx: Extension<Arc<AppContext>>) -> Response {
    let Some(token) = extract_bearer_token(&headers) else {
        return missing_token();
    };

    match ctx.upstream.list_indexes(&token).await {
        Ok(indexes) => Json(indexes).into_response(),
        Err(err) => upstream_failure(&err),
    }
}
