use crate::{
    api::handlers::{assistants, console, health, indexes, session, sign_in, tools},
    guard,
    idp::{flow::SignInFlow, IdpClient},
    session::store::CookieSessionStore,
    upstream::UpstreamClient,
};
use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::get,
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa_swagger_ui::SwaggerUi;

pub mod handlers;
mod openapi;


pub use openapi::openapi;

/// Everything the handlers share: the identity provider client, the pending
/// sign-ins, the cookie store, and the upstream client.
#[derive(Debug)]
pub struct AppContext {
    pub idp: IdpClient,
    pub flow: SignInFlow,
    pub sessions: CookieSessionStore,
    pub upstream: UpstreamClient,
    pub public_url: String,
}

impl AppContext {
    /// Callback URL registered with the identity provider.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("{}/auth/callback", self.public_url.trim_end_matches('/'))
    }
}

/// Build the application router around a shared context.
///
/// Kept separate from [`new`] so tests can drive the full middleware stack
/// without binding a port.
#[must_use]
pub fn app(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(console::console))
        .route("/auth/sign-in", get(sign_in::sign_in))
        .route("/auth/callback", get(sign_in::callback))
        .route("/auth/sign-out", get(sign_in::sign_out).post(sign_in::sign_out))
        .route("/api/auth/session", get(session::session))
        .route(
            "/api/assistants",
            get(assistants::list).post(assistants::upsert),
        )
        .route("/api/assistant", get(assistants::by_name))
        .route("/api/tools", get(tools::list))
        .route("/api/indexes", get(indexes::list))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(middleware::from_fn_with_state(
                    Arc::clone(&ctx),
                    guard::intercept,
                ))
                .layer(Extension(Arc::clone(&ctx))),
        )
        .route("/health", get(health::health).options(health::health))
        .layer(Extension(ctx))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, ctx: Arc<AppContext>) -> Result<()> {
    let app = app(ctx);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
