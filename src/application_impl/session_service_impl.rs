use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Issues, validates, rotates and revokes session lineages on top of a
/// `SessionStore`. Time is read from the injected clock.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    ttls: SessionTtls,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>, ttls: SessionTtls) -> Self {
        Self { store, clock, ttls }
    }
}

#[async_trait::async_trait]
impl SessionService for SessionManager {
    async fn issue(&self, user: UserIdentity) -> IssuedSession {
        let session = Session::issue(user, self.clock.now(), self.ttls);
        let issued = IssuedSession {
            user: session.user.clone(),
            access_token: session.access_token.clone(),
            access_expires_at: session.access_expires_at,
            refresh_token: session.refresh_token.clone(),
            refresh_expires_at: session.refresh_expires_at,
        };
        self.store.insert(session).await;
        info!(username = %issued.user, "session issued");
        issued
    }

    async fn validate(&self, token: Option<&AccessToken>) -> Result<ValidatedSession, SessionError> {
        let token = token.ok_or(SessionError::Unauthorized)?;
        let session = self
            .store
            .find_by_access(token)
            .await
            .ok_or(SessionError::Unauthorized)?;
        if session.is_access_expired(self.clock.now()) {
            debug!(username = %session.user, "access token expired");
            return Err(SessionError::AccessExpired);
        }
        Ok(ValidatedSession {
            user: session.user,
            access_expires_at: session.access_expires_at,
        })
    }

    async fn rotate(&self, token: Option<&RefreshToken>) -> Result<RotatedAccess, SessionError> {
        let token = token.ok_or(SessionError::Unauthorized)?;
        let now = self.clock.now();
        let grant = AccessGrant::mint(now, self.ttls.access());
        let session = self
            .store
            .rotate_access(token, grant, now)
            .await
            .map_err(|e| match e {
                RotateError::NotFound => SessionError::InvalidRefreshToken,
                RotateError::Expired => SessionError::RefreshExpired,
            })?;
        info!(username = %session.user, "access token rotated");
        Ok(RotatedAccess {
            access_token: session.access_token,
            access_expires_at: session.access_expires_at,
        })
    }

    async fn revoke(&self, token: &AccessToken) {
        if self.store.remove_by_access(token).await {
            info!("session revoked");
        }
    }

    async fn revoke_refresh(&self, token: &RefreshToken) {
        if self.store.remove_by_refresh(token).await {
            info!("session revoked by refresh token");
        }
    }

    async fn evict_expired(&self) -> usize {
        let cutoff = self
            .clock
            .now()
            .checked_sub_signed(self.ttls.refresh())
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.store.evict_expired(cutoff).await
    }

    async fn session_count(&self) -> usize {
        self.store.len().await
    }

    fn ttls(&self) -> SessionTtls {
        self.ttls
    }
}
