use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use gw_core::ports::AuthSessionPort;
use tracing::warn;

/// Auth session holding a fixed bearer token.
///
/// On expiry the token is dropped, so later requests go out unauthenticated
/// and fail with `auth` until a new token is set.
#[derive(Default)]
pub struct StaticAuthSession {
    token: RwLock<Option<String>>,
    expirations: AtomicUsize,
}

impl StaticAuthSession {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
            expirations: AtomicUsize::new(0),
        }
    }

    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
    }

    /// How many times the session was reported expired.
    pub fn expirations(&self) -> usize {
        self.expirations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthSessionPort for StaticAuthSession {
    fn bearer_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    async fn session_expired(&self) {
        warn!("session expired; sign-in required");
        self.expirations.fetch_add(1, Ordering::SeqCst);
        self.set_token(None);
    }
}
