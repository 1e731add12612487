use utoipa::OpenApi;

use crate::api::handlers::{assistants, health, indexes, session, tools, ErrorBody};
use crate::session::SessionError;
use crate::upstream::AssistantConfig;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        session::session,
        assistants::list,
        assistants::upsert,
        assistants::by_name,
        tools::list,
        indexes::list
    ),
    components(schemas(
        health::Health,
        session::SessionResponse,
        SessionError,
        AssistantConfig,
        ErrorBody
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Session state for the console client"),
        (name = "assistants", description = "Assistant management"),
        (name = "catalog", description = "Tools and indexes available to assistants")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
