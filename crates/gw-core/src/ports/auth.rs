use async_trait::async_trait;

#[async_trait]
pub trait AuthSessionPort: Send + Sync {
    /// Bearer token of the signed-in user, if any.
    fn bearer_token(&self) -> Option<String>;

    /// Called once a request was rejected with 401; the host bounces the
    /// user to sign-in.
    async fn session_expired(&self);
}
