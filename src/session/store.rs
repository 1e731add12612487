//! Signed-cookie persistence for the session record.
//!
//! The record travels in a single HttpOnly cookie as
//! `v1.<base64url(json)>.<base64url(hmac-sha256)>`. Loading verifies the
//! signature in constant time before touching the payload; anything that does
//! not verify is treated as no session at all.

use anyhow::Result;
use axum::http::{header, HeaderMap};
use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::session::SessionTokenRecord;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE_NAME: &str = "asisto_session";

const TOKEN_VERSION: &str = "v1";

/// Cookie lifetime. The record inside carries its own access token expiry;
/// this only bounds how long the refresh token outlives the browser session.
const SESSION_COOKIE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Stateless session store backed by an HMAC-signed browser cookie.
#[derive(Debug, Clone)]
pub struct CookieSessionStore {
    secret: SecretString,
    cookie_secure: bool,
}

impl CookieSessionStore {
    #[must_use]
    pub fn new(secret: SecretString, cookie_secure: bool) -> Self {
        Self {
            secret,
            cookie_secure,
        }
    }

    /// Load the session record from the request cookies. Returns `None` for
    /// a missing cookie, a bad signature, or an unparseable payload.
    #[must_use]
    pub fn load(&self, headers: &HeaderMap) -> Option<SessionTokenRecord> {
        let token = extract_session_cookie(headers)?;
        self.open(&token)
    }

    /// Serialize and sign the record into a `Set-Cookie` value.
    pub fn save(&self, record: &SessionTokenRecord) -> Result<String> {
        let token = self.seal(record)?;
        Ok(format!(
            "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_COOKIE_TTL_SECS}{}",
            self.secure_suffix()
        ))
    }

    /// `Set-Cookie` value that removes the session cookie.
    #[must_use]
    pub fn clear(&self) -> String {
        format!(
            "{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
            self.secure_suffix()
        )
    }

    fn seal(&self, record: &SessionTokenRecord) -> Result<String> {
        let payload = Base64UrlUnpadded::encode_string(&serde_json::to_vec(record)?);
        let signature = self.signature(&payload)?;
        Ok(format!(
            "{TOKEN_VERSION}.{payload}.{}",
            Base64UrlUnpadded::encode_string(&signature)
        ))
    }

    fn open(&self, token: &str) -> Option<SessionTokenRecord> {
        let mut parts = token.split('.');
        let (version, payload, signature) = (parts.next()?, parts.next()?, parts.next()?);
        if version != TOKEN_VERSION || parts.next().is_some() {
            return None;
        }

        let signature = Base64UrlUnpadded::decode_vec(signature).ok()?;
        let mut mac = self.keyed_mac().ok()?;
        mac.update(TOKEN_VERSION.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let payload = Base64UrlUnpadded::decode_vec(payload).ok()?;
        serde_json::from_slice(&payload).ok()
    }

    fn signature(&self, payload: &str) -> Result<Vec<u8>> {
        let mut mac = self.keyed_mac()?;
        mac.update(TOKEN_VERSION.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn keyed_mac(&self) -> Result<HmacSha256> {
        Ok(HmacSha256::new_from_slice(
            self.secret.expose_secret().as_bytes(),
        )?)
    }

    fn secure_suffix(&self) -> &'static str {
        if self.cookie_secure {
            "; Secure"
        } else {
            ""
        }
    }
}

fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE_NAME).then(|| value.to_string())
    })
}
