//! # Asisto (Assistant Configuration Console)
//!
//! `asisto` is the backend for a browser console that manages assistant
//! definitions served by an upstream model-serving API.
//!
//! ## Sessions
//!
//! Sign-in happens against an external OAuth2 identity provider. The token
//! pair lives in an HMAC-signed, HttpOnly browser cookie; there is no
//! server-side session storage. Expired access tokens are refreshed silently
//! on the next session read, and any refresh failure clears the credentials
//! and marks the session so the client can start one interactive sign-in.
//!
//! ## Route Guard
//!
//! Browser pages are gated on the presence of the session cookie and
//! redirect to sign-in when it is missing. `/api` routes are never
//! redirected; they answer `401` so clients can react in code.
//!
//! ## API Proxy
//!
//! The `/api` routes front the upstream assistant API, forwarding the
//! caller's bearer token untouched. The console holds no upstream
//! credentials of its own.

pub mod api;
pub mod cli;
pub mod guard;
pub mod idp;
pub mod session;
pub mod upstream;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
