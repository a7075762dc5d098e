use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Lineages {
    by_refresh: HashMap<RefreshToken, Session>,
    access_index: HashMap<AccessToken, RefreshToken>,
}

impl Lineages {
    fn remove_lineage(&mut self, refresh_token: &RefreshToken) -> bool {
        match self.by_refresh.remove(refresh_token) {
            Some(session) => {
                self.access_index.remove(&session.access_token);
                true
            }
            None => false,
        }
    }
}

/// Process-local session store. A single mutex guards both maps so the
/// index never disagrees with the lineages it points at.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Lineages>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Writers only touch the maps after all checks pass, so a poisoned
    // guard still holds consistent data.
    fn lock(&self) -> MutexGuard<'_, Lineages> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: Session) {
        let mut lineages = self.lock();
        if let Some(previous) = lineages.by_refresh.get(&session.refresh_token) {
            let stale = previous.access_token.clone();
            lineages.access_index.remove(&stale);
        }
        lineages
            .access_index
            .insert(session.access_token.clone(), session.refresh_token.clone());
        lineages
            .by_refresh
            .insert(session.refresh_token.clone(), session);
    }

    async fn find_by_access(&self, token: &AccessToken) -> Option<Session> {
        let lineages = self.lock();
        let refresh_token = lineages.access_index.get(token)?;
        lineages.by_refresh.get(refresh_token).cloned()
    }

    async fn rotate_access(
        &self,
        refresh_token: &RefreshToken,
        grant: AccessGrant,
        now: DateTime<Utc>,
    ) -> Result<Session, RotateError> {
        let mut guard = self.lock();
        let lineages = &mut *guard;
        let session = lineages
            .by_refresh
            .get_mut(refresh_token)
            .ok_or(RotateError::NotFound)?;
        if session.is_refresh_expired(now) {
            return Err(RotateError::Expired);
        }

        lineages.access_index.remove(&session.access_token);
        lineages
            .access_index
            .insert(grant.access_token.clone(), refresh_token.clone());
        session.access_token = grant.access_token;
        session.access_expires_at = grant.access_expires_at;
        Ok(session.clone())
    }

    async fn remove_by_access(&self, token: &AccessToken) -> bool {
        let mut lineages = self.lock();
        match lineages.access_index.get(token).cloned() {
            Some(refresh_token) => lineages.remove_lineage(&refresh_token),
            None => false,
        }
    }

    async fn remove_by_refresh(&self, token: &RefreshToken) -> bool {
        self.lock().remove_lineage(token)
    }

    async fn evict_expired(&self, cutoff: DateTime<Utc>) -> usize {
        let mut guard = self.lock();
        let lineages = &mut *guard;
        let before = lineages.by_refresh.len();
        lineages
            .by_refresh
            .retain(|_, session| !session.is_refresh_expired(cutoff));
        let by_refresh = &lineages.by_refresh;
        lineages
            .access_index
            .retain(|_, refresh_token| by_refresh.contains_key(refresh_token));
        before - lineages.by_refresh.len()
    }

    async fn len(&self) -> usize {
        self.lock().by_refresh.len()
    }
}
