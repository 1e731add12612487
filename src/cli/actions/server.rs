use crate::{
    api::{self, AppContext},
    idp::{flow::SignInFlow, IdpClient, IdpConfig},
    session::store::CookieSessionStore,
    upstream::UpstreamClient,
};
use anyhow::Result;
use secrecy::SecretString;
use std::{fmt, sync::Arc};
use tracing::info;

pub struct Args {
    pub port: u16,
    pub issuer: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub public_url: String,
    pub session_secret: SecretString,
    pub upstream_url: String,
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("issuer", &self.issuer)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("public_url", &self.public_url)
            .field("session_secret", &"***")
            .field("upstream_url", &self.upstream_url)
            .finish()
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the HTTP clients cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    // Secure cookies only make sense when the browser reaches us over HTTPS.
    let cookie_secure = args.public_url.starts_with("https://");

    let idp = IdpClient::new(IdpConfig {
        issuer: args.issuer,
        client_id: args.client_id,
        client_secret: args.client_secret,
    })?;

    let ctx = Arc::new(AppContext {
        idp,
        flow: SignInFlow::new(),
        sessions: CookieSessionStore::new(args.session_secret, cookie_secure),
        upstream: UpstreamClient::new(args.upstream_url)?,
        public_url: args.public_url,
    });

    api::new(args.port, ctx).await
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("issuer", args.issuer.clone()),
        ("client_id", args.client_id.clone()),
        ("public_url", args.public_url.clone()),
        ("upstream_url", args.upstream_url.clone()),
        (
            "secure_cookies",
            args.public_url.starts_with("https://").to_string(),
        ),
    ];

    let width = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = String::from("Startup configuration:");
    for (key, value) in &entries {
        message.push_str(&format!("\n  {key:width$}  {value}"));
    }

    info!("{message}");
}
