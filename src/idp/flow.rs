//! In-flight interactive sign-ins.
//!
//! Each sign-in gets a one-time state and a PKCE verifier. The verifier never
//! leaves the process; only its S256 challenge goes out with the redirect.

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{distributions::Alphanumeric, Rng};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// How long a started sign-in may wait for its callback.
const PENDING_TTL: Duration = Duration::from_secs(600);

const VERIFIER_LEN: usize = 64;

#[derive(Debug)]
struct PendingSignIn {
    code_verifier: String,
    created_at: Instant,
}

/// Parameters for one authorization redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInChallenge {
    pub state: String,
    pub code_challenge: String,
}

/// Tracks sign-ins between the authorization redirect and the callback.
#[derive(Debug, Default)]
pub struct SignInFlow {
    pending: Mutex<HashMap<String, PendingSignIn>>,
}

impl SignInFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a sign-in: mint a state and a verifier, remember them, and
    /// return the state with the verifier's S256 challenge.
    pub fn begin(&self) -> SignInChallenge {
        let state = Uuid::new_v4().simple().to_string();
        let code_verifier = random_verifier();
        let code_challenge =
            Base64UrlUnpadded::encode_string(&Sha256::digest(code_verifier.as_bytes()));

        let mut pending = self.lock();
        pending.retain(|_, entry| entry.created_at.elapsed() <= PENDING_TTL);
        pending.insert(
            state.clone(),
            PendingSignIn {
                code_verifier,
                created_at: Instant::now(),
            },
        );

        SignInChallenge {
            state,
            code_challenge,
        }
    }

    /// Consume the state from the callback. Returns the matching verifier,
    /// or `None` for an unknown, replayed, or expired state.
    pub fn complete(&self, state: &str) -> Option<String> {
        let entry = self.lock().remove(state)?;
        (entry.created_at.elapsed() <= PENDING_TTL).then_some(entry.code_verifier)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, PendingSignIn>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn random_verifier() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(VERIFIER_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_then_complete_returns_matching_verifier() {
        let flow = SignInFlow::new();
        let challenge = flow.begin();
        let verifier = flow.complete(&challenge.state).expect("verifier");

        assert_eq!(verifier.len(), VERIFIER_LEN);
        assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(
            challenge.code_challenge,
            Base64UrlUnpadded::encode_string(&Sha256::digest(verifier.as_bytes()))
        );
    }

    #[test]
    fn state_is_single_use() {
        let flow = SignInFlow::new();
        let challenge = flow.begin();
        assert!(flow.complete(&challenge.state).is_some());
        assert_eq!(flow.complete(&challenge.state), None);
    }

    #[test]
    fn unknown_state_is_rejected() {
        let flow = SignInFlow::new();
        flow.begin();
        assert_eq!(flow.complete("no-such-state"), None);
    }

    #[test]
    fn each_sign_in_gets_distinct_state_and_challenge() {
        let flow = SignInFlow::new();
        let first = flow.begin();
        let second = flow.begin();
        assert_ne!(first.state, second.state);
        assert_ne!(first.code_challenge, second.code_challenge);
    }

    #[test]
    fn expired_state_is_rejected() {
        let flow = SignInFlow::new();
        let stale = Instant::now()
            .checked_sub(PENDING_TTL + Duration::from_secs(1))
            .expect("clock supports backdating");
        flow.lock().insert(
            "st-old".to_string(),
            PendingSignIn {
                code_verifier: "v".to_string(),
                created_at: stale,
            },
        );

        assert_eq!(flow.complete("st-old"), None);
    }

    #[test]
    fn begin_prunes_expired_entries() {
        let flow = SignInFlow::new();
        let stale = Instant::now()
            .checked_sub(PENDING_TTL + Duration::from_secs(1))
            .expect("clock supports backdating");
        flow.lock().insert(
            "st-old".to_string(),
            PendingSignIn {
                code_verifier: "v".to_string(),
                created_at: stale,
            },
        );

        flow.begin();
        assert!(!flow.lock().contains_key("st-old"));
    }
}
