use crate::domain_model::*;
use chrono::{DateTime, Utc};

/// Client-facing session failures. None of them are retryable by the
/// server; the client must refresh or log in again.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Access token expired")]
    AccessExpired,
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
    #[error("Refresh token expired")]
    RefreshExpired,
}

#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub user: UserIdentity,
    pub access_token: AccessToken,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_token: RefreshToken,
    pub refresh_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ValidatedSession {
    pub user: UserIdentity,
    pub access_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RotatedAccess {
    pub access_token: AccessToken,
    pub access_expires_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    async fn issue(&self, user: UserIdentity) -> IssuedSession;
    async fn validate(&self, token: Option<&AccessToken>) -> Result<ValidatedSession, SessionError>;
    async fn rotate(&self, token: Option<&RefreshToken>) -> Result<RotatedAccess, SessionError>;
    /// Idempotent; unknown tokens are ignored.
    async fn revoke(&self, token: &AccessToken);
    async fn revoke_refresh(&self, token: &RefreshToken);
    /// Drops lineages whose refresh token expired more than one refresh TTL
    /// ago. Until then a late rotation still reports `RefreshExpired`.
    async fn evict_expired(&self) -> usize;
    async fn session_count(&self) -> usize;
    fn ttls(&self) -> SessionTtls;
}
