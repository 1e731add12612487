use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{auth, session, upstream};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let issuer = matches
        .get_one::<String>(auth::ARG_ISSUER)
        .cloned()
        .context("missing required argument: --issuer")?;

    let client_id = matches
        .get_one::<String>(auth::ARG_CLIENT_ID)
        .cloned()
        .context("missing required argument: --client-id")?;

    let client_secret = matches
        .get_one::<String>(auth::ARG_CLIENT_SECRET)
        .cloned()
        .map(SecretString::from)
        .context("missing required argument: --client-secret")?;

    let public_url = matches
        .get_one::<String>(auth::ARG_PUBLIC_URL)
        .cloned()
        .unwrap_or_else(|| "http://localhost:8080".to_string());

    let session_secret = matches
        .get_one::<String>(session::ARG_SESSION_SECRET)
        .cloned()
        .map(SecretString::from)
        .context("missing required argument: --session-secret")?;

    let upstream_url = matches
        .get_one::<String>(upstream::ARG_UPSTREAM_URL)
        .cloned()
        .context("missing required argument: --upstream-url")?;

    Ok(Action::Server(Args {
        port,
        issuer,
        client_id,
        client_secret,
        public_url,
        session_secret,
        upstream_url,
    }))
}
