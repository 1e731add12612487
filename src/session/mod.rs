//! Session token lifecycle: the access/refresh token pair and its transitions.
//!
//! The record is materialized on every request that needs the session. An
//! unexpired access token is returned untouched; an expired one triggers a
//! silent refresh against the identity provider. Every failure path resolves
//! to a failed record with all credentials cleared, never to an error that
//! escapes the lifecycle boundary.

pub mod store;
pub mod trigger;

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;
use utoipa::ToSchema;

use crate::idp::IdpClient;

/// Terminal session failures surfaced to the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SessionError {
    RefreshFailed,
}

/// Token set issued by the identity provider at sign-in or on a successful
/// refresh. `expires_in` is in seconds, as delivered on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: u64,
}

/// The per-user session record held in the signed cookie.
///
/// Invariant: after any lifecycle transition, either the record carries an
/// unexpired access token or `error` is set with every credential field
/// cleared. A failed record never carries credentials forward.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokenRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Absolute expiry of `access_token`, epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_expires_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SessionError>,
}

impl SessionTokenRecord {
    /// Record for a freshly signed-in user: expiry stamped from `expires_in`,
    /// refresh token stored (empty when the provider sent none), prior error
    /// cleared.
    #[must_use]
    pub fn signed_in(tokens: &TokenSet, now_ms: u64) -> Self {
        Self {
            access_token: Some(tokens.access_token.clone()),
            access_token_expires_at: Some(
                now_ms.saturating_add(tokens.expires_in.saturating_mul(1000)),
            ),
            refresh_token: Some(tokens.refresh_token.clone().unwrap_or_default()),
            error: None,
        }
    }

    /// Failed record: error set, every credential field cleared.
    #[must_use]
    pub fn failed() -> Self {
        Self {
            access_token: None,
            access_token_expires_at: None,
            refresh_token: None,
            error: Some(SessionError::RefreshFailed),
        }
    }

    /// True when the access token exists and has not reached its expiry.
    #[must_use]
    pub fn is_fresh(&self, now_ms: u64) -> bool {
        self.access_token.is_some()
            && self
                .access_token_expires_at
                .is_some_and(|expires_at| expires_at > now_ms)
    }

    /// Read-only projection handed to the rendering layer for one render.
    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView {
            access_token: self.access_token.clone(),
            error: self.error,
        }
    }
}

/// Derived, read-only projection of the session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SessionView {
    pub access_token: Option<String>,
    pub error: Option<SessionError>,
}

/// Materialize the session record for one request.
///
/// Fresh tokens are present only immediately after sign-in; otherwise the
/// record is returned unchanged while its access token is unexpired, and
/// refreshed when it is not.
pub async fn materialize(
    idp: &IdpClient,
    record: SessionTokenRecord,
    fresh: Option<TokenSet>,
) -> SessionTokenRecord {
    if let Some(tokens) = fresh {
        return SessionTokenRecord::signed_in(&tokens, now_epoch_millis());
    }

    if record.is_fresh(now_epoch_millis()) {
        return record;
    }

    refresh(idp, record).await
}

/// Exchange the stored refresh token for a new access token.
///
/// Fails closed: a missing refresh token, a provider rejection, or any
/// transport/parse failure all produce a failed record. This function never
/// returns an error past its boundary.
pub async fn refresh(idp: &IdpClient, record: SessionTokenRecord) -> SessionTokenRecord {
    let Some(refresh_token) = record
        .refresh_token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
    else {
        return SessionTokenRecord::failed();
    };

    match idp.refresh_access_token(refresh_token).await {
        Ok(tokens) => {
            let now = now_epoch_millis();
            SessionTokenRecord {
                access_token_expires_at: Some(
                    now.saturating_add(tokens.expires_in.saturating_mul(1000)),
                ),
                access_token: Some(tokens.access_token),
                // Rotation is optional: keep the previous refresh token when
                // the provider did not send a replacement.
                refresh_token: tokens
                    .refresh_token
                    .filter(|token| !token.is_empty())
                    .or_else(|| Some(refresh_token.to_string())),
                error: None,
            }
        }
        Err(err) => {
            warn!("Failed to refresh access token: {err:#}");
            SessionTokenRecord::failed()
        }
    }
}

pub(crate) fn now_epoch_millis() -> u64 {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Form, Json, Router};
    use secrecy::SecretString;
    use serde_json::json;
    use std::collections::HashMap;

    fn token_set(refresh: Option<&str>) -> TokenSet {
        TokenSet {
            access_token: "a1".to_string(),
            refresh_token: refresh.map(str::to_string),
            expires_in: 3600,
        }
    }

    /// Identity provider client pointed at a port nothing listens on; any
    /// network call from the code under test would come back as a failure.
    fn unreachable_idp() -> IdpClient {
        IdpClient::new(crate::idp::IdpConfig {
            issuer: "http://127.0.0.1:9".to_string(),
            client_id: "client-id".to_string(),
            client_secret: SecretString::from("secret".to_string()),
        })
        .expect("client should build")
    }

    async fn spawn_idp(response: serde_json::Value) -> (IdpClient, tokio::task::JoinHandle<()>) {
        let app = Router::new().route(
            "/oauth2/v2.0/token",
            post(move |Form(form): Form<HashMap<String, String>>| async move {
                assert_eq!(form.get("grant_type").map(String::as_str), Some("refresh_token"));
                Json(response.clone())
            }),
        );

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
            .await
            .expect("bind token listener");
        let addr = listener.local_addr().expect("token listener addr");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let idp = IdpClient::new(crate::idp::IdpConfig {
            issuer: format!("http://{addr}"),
            client_id: "client-id".to_string(),
            client_secret: SecretString::from("secret".to_string()),
        })
        .expect("client should build");

        (idp, handle)
    }

    #[test]
    fn signed_in_stamps_expiry_from_expires_in() {
        let record = SessionTokenRecord::signed_in(&token_set(Some("r1")), 1_000);
        assert_eq!(record.access_token.as_deref(), Some("a1"));
        assert_eq!(record.access_token_expires_at, Some(3_601_000));
        assert_eq!(record.refresh_token.as_deref(), Some("r1"));
        assert_eq!(record.error, None);
    }

    #[test]
    fn signed_in_defaults_missing_refresh_token_to_empty() {
        let record = SessionTokenRecord::signed_in(&token_set(None), 0);
        assert_eq!(record.refresh_token.as_deref(), Some(""));
    }

    #[test]
    fn failed_record_carries_no_credentials() {
        let record = SessionTokenRecord::failed();
        assert_eq!(record.access_token, None);
        assert_eq!(record.access_token_expires_at, None);
        assert_eq!(record.refresh_token, None);
        assert_eq!(record.error, Some(SessionError::RefreshFailed));
    }

    #[tokio::test]
    async fn materialize_returns_unexpired_record_unchanged() {
        let record = SessionTokenRecord {
            access_token: Some("a1".to_string()),
            access_token_expires_at: Some(now_epoch_millis() + 60_000),
            refresh_token: Some("r1".to_string()),
            error: None,
        };

        // The provider is unreachable: an unchanged result proves the fast
        // path made no network call.
        let materialized = materialize(&unreachable_idp(), record.clone(), None).await;
        assert_eq!(materialized, record);
    }

    #[tokio::test]
    async fn materialize_with_fresh_tokens_clears_prior_error() {
        let failed = SessionTokenRecord::failed();
        let materialized =
            materialize(&unreachable_idp(), failed, Some(token_set(Some("r1")))).await;
        assert_eq!(materialized.error, None);
        assert_eq!(materialized.access_token.as_deref(), Some("a1"));
        assert_eq!(materialized.refresh_token.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn refresh_without_refresh_token_fails_closed_without_network() {
        for refresh_token in [None, Some(String::new()), Some("   ".to_string())] {
            let record = SessionTokenRecord {
                access_token: Some("a1".to_string()),
                access_token_expires_at: Some(1),
                refresh_token,
                error: None,
            };
            let refreshed = refresh(&unreachable_idp(), record).await;
            assert_eq!(refreshed, SessionTokenRecord::failed());
        }
    }

    #[tokio::test]
    async fn refresh_keeps_previous_token_when_provider_does_not_rotate() {
        let (idp, handle) = spawn_idp(json!({
            "access_token": "a2",
            "expires_in": 3600
        }))
        .await;

        let before = now_epoch_millis();
        let record = SessionTokenRecord {
            access_token: Some("a1".to_string()),
            access_token_expires_at: Some(1),
            refresh_token: Some("r1".to_string()),
            error: None,
        };
        let refreshed = refresh(&idp, record).await;
        let after = now_epoch_millis();
        handle.abort();

        assert_eq!(refreshed.access_token.as_deref(), Some("a2"));
        assert_eq!(refreshed.refresh_token.as_deref(), Some("r1"));
        assert_eq!(refreshed.error, None);

        let expires_at = refreshed.access_token_expires_at.expect("expiry stamped");
        assert!(expires_at >= before + 3_600_000);
        assert!(expires_at <= after + 3_600_000);
    }

    #[tokio::test]
    async fn refresh_adopts_rotated_refresh_token() {
        let (idp, handle) = spawn_idp(json!({
            "access_token": "a2",
            "refresh_token": "r2",
            "expires_in": 60
        }))
        .await;

        let record = SessionTokenRecord {
            access_token: None,
            access_token_expires_at: Some(1),
            refresh_token: Some("r1".to_string()),
            error: None,
        };
        let refreshed = refresh(&idp, record).await;
        handle.abort();

        assert_eq!(refreshed.refresh_token.as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn refresh_of_independent_copies_yields_two_valid_records() {
        let (idp, handle) = spawn_idp(json!({
            "access_token": "a2",
            "expires_in": 3600
        }))
        .await;

        let record = SessionTokenRecord {
            access_token: Some("a1".to_string()),
            access_token_expires_at: Some(1),
            refresh_token: Some("r1".to_string()),
            error: None,
        };

        let (first, second) = tokio::join!(
            refresh(&idp, record.clone()),
            refresh(&idp, record.clone())
        );
        handle.abort();

        for refreshed in [first, second] {
            assert_eq!(refreshed.access_token.as_deref(), Some("a2"));
            assert_eq!(refreshed.error, None);
            assert!(refreshed.is_fresh(now_epoch_millis()));
        }
    }

    #[tokio::test]
    async fn refresh_rejection_fails_closed() {
        let app = Router::new().route(
            "/oauth2/v2.0/token",
            post(|| async {
                (
                    axum::http::StatusCode::BAD_REQUEST,
                    Json(json!({"error": "invalid_grant"})),
                )
            }),
        );
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
            .await
            .expect("bind token listener");
        let addr = listener.local_addr().expect("token listener addr");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let idp = IdpClient::new(crate::idp::IdpConfig {
            issuer: format!("http://{addr}"),
            client_id: "client-id".to_string(),
            client_secret: SecretString::from("secret".to_string()),
        })
        .expect("client should build");

        let record = SessionTokenRecord {
            access_token: Some("a1".to_string()),
            access_token_expires_at: Some(1),
            refresh_token: Some("r1".to_string()),
            error: None,
        };
        let refreshed = refresh(&idp, record).await;
        handle.abort();

        assert_eq!(refreshed, SessionTokenRecord::failed());
    }

    #[tokio::test]
    async fn refresh_transport_failure_fails_closed() {
        let record = SessionTokenRecord {
            access_token: None,
            access_token_expires_at: Some(1),
            refresh_token: Some("r1".to_string()),
            error: None,
        };
        let refreshed = refresh(&unreachable_idp(), record).await;
        assert_eq!(refreshed, SessionTokenRecord::failed());
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = SessionTokenRecord {
            access_token: Some("a1".to_string()),
            access_token_expires_at: Some(42),
            refresh_token: Some("r1".to_string()),
            error: None,
        };
        let value = serde_json::to_value(&record).expect("serialize");
        let decoded: SessionTokenRecord = serde_json::from_value(value).expect("deserialize");
        assert_eq!(decoded, record);
    }

    #[test]
    fn error_serializes_as_camel_case() {
        let value = serde_json::to_value(SessionError::RefreshFailed).expect("serialize");
        assert_eq!(value, json!("refreshFailed"));
    }
}
