use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum RotateError {
    #[error("no session holds this refresh token")]
    NotFound,
    #[error("refresh token expired")]
    Expired,
}

/// Storage for session lineages, keyed by refresh token with a secondary
/// index on the current access token. Every method is atomic with respect
/// to the others.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: Session);

    async fn find_by_access(&self, token: &AccessToken) -> Option<Session>;

    /// Swap the lineage's access token for `grant` if the refresh window is
    /// still open at `now`. The superseded access token stops resolving.
    async fn rotate_access(
        &self,
        refresh_token: &RefreshToken,
        grant: AccessGrant,
        now: DateTime<Utc>,
    ) -> Result<Session, RotateError>;

    /// Returns true if a lineage was removed.
    async fn remove_by_access(&self, token: &AccessToken) -> bool;

    async fn remove_by_refresh(&self, token: &RefreshToken) -> bool;

    /// Drop every lineage whose refresh window closed before `cutoff`.
    async fn evict_expired(&self, cutoff: DateTime<Utc>) -> usize;

    async fn len(&self) -> usize;
}
