//! OAuth2 client for the identity provider.
//!
//! Covers the three wire interactions the console needs: building the
//! authorization redirect, exchanging an authorization code, and refreshing
//! an access token. Endpoint paths follow the provider's v2.0 layout under
//! the configured issuer.

pub mod flow;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::session::TokenSet;
use crate::APP_USER_AGENT;

/// Scopes requested at sign-in. `offline_access` is what makes the provider
/// issue a refresh token at all.
pub const SCOPE: &str = "openid profile email offline_access";

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Identity provider settings, resolved from the command line.
#[derive(Clone)]
pub struct IdpConfig {
    pub issuer: String,
    pub client_id: String,
    pub client_secret: SecretString,
}

impl fmt::Debug for IdpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdpConfig")
            .field("issuer", &self.issuer)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct IdpClient {
    http: Client,
    config: IdpConfig,
}

/// Token endpoint response for both the refresh and the code grant.
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: u64,
}

impl From<TokenEndpointResponse> for TokenSet {
    fn from(response: TokenEndpointResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_in: response.expires_in,
        }
    }
}

impl IdpClient {
    pub fn new(config: IdpConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("Failed to build identity provider HTTP client")?;

        Ok(Self { http, config })
    }

    fn issuer(&self) -> &str {
        self.config.issuer.trim_end_matches('/')
    }

    fn token_endpoint(&self) -> String {
        format!("{}/oauth2/v2.0/token", self.issuer())
    }

    fn authorize_endpoint(&self) -> String {
        format!("{}/oauth2/v2.0/authorize", self.issuer())
    }

    /// Authorization URL the browser is redirected to at sign-in.
    pub fn authorize_url(&self, redirect_uri: &str, state: &str, challenge: &str) -> Result<Url> {
        let mut url = Url::parse(&self.authorize_endpoint())
            .context("Invalid identity provider issuer URL")?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_mode", "query")
            .append_pair("scope", SCOPE)
            .append_pair("state", state)
            .append_pair("code_challenge", challenge)
            .append_pair("code_challenge_method", "S256");

        Ok(url)
    }

    /// Refresh grant. The form carries exactly the grant type, the refresh
    /// token, the client id and the scope; the client secret is not sent.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenSet> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", &self.config.client_id),
            ("scope", SCOPE),
        ];

        self.request_tokens(&params).await
    }

    /// Authorization code grant, completing an interactive sign-in.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> Result<TokenSet> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", &self.config.client_id),
            ("client_secret", self.config.client_secret.expose_secret()),
            ("code_verifier", code_verifier),
            ("scope", SCOPE),
        ];

        self.request_tokens(&params).await
    }

    async fn request_tokens(&self, params: &[(&str, &str)]) -> Result<TokenSet> {
        let response = self
            .http
            .post(self.token_endpoint())
            .form(params)
            .send()
            .await
            .context("Token endpoint request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Token endpoint returned {status}: {body}");
        }

        let tokens: TokenEndpointResponse = response
            .json()
            .await
            .context("Failed to parse token endpoint response")?;

        Ok(tokens.into())
    }
}
