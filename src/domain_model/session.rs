use crate::domain_model::{AccessToken, RefreshToken, UserIdentity};
use chrono::{DateTime, TimeDelta, Utc};

#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum TtlError {
    #[error("{0} TTL must be greater than zero")]
    Zero(&'static str),
    #[error("{name} TTL of {secs}s exceeds the {max}s limit", max = SessionTtls::MAX_SECS)]
    TooLong { name: &'static str, secs: u64 },
}

/// Lifetimes applied when minting tokens. Both are positive and at most
/// `MAX_SECS`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SessionTtls {
    access: TimeDelta,
    refresh: TimeDelta,
}

impl SessionTtls {
    /// One year.
    pub const MAX_SECS: u64 = 365 * 24 * 60 * 60;

    pub fn from_secs(access_secs: u64, refresh_secs: u64) -> Result<Self, TtlError> {
        Ok(Self {
            access: bounded("access", access_secs)?,
            refresh: bounded("refresh", refresh_secs)?,
        })
    }

    pub fn access(&self) -> TimeDelta {
        self.access
    }

    pub fn refresh(&self) -> TimeDelta {
        self.refresh
    }
}

fn bounded(name: &'static str, secs: u64) -> Result<TimeDelta, TtlError> {
    if secs == 0 {
        return Err(TtlError::Zero(name));
    }
    if secs > SessionTtls::MAX_SECS {
        return Err(TtlError::TooLong { name, secs });
    }
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .ok_or(TtlError::TooLong { name, secs })
}

impl Default for SessionTtls {
    fn default() -> Self {
        Self {
            access: TimeDelta::seconds(20),
            refresh: TimeDelta::seconds(300),
        }
    }
}

/// `now + ttl`, pinned to the latest representable instant instead of
/// overflowing.
pub fn deadline(now: DateTime<Utc>, ttl: TimeDelta) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// One session lineage: the current access token plus the refresh token it
/// was derived from. Rotation replaces `access_token` and
/// `access_expires_at` in place; the refresh side never changes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Session {
    pub access_token: AccessToken,
    pub user: UserIdentity,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_token: RefreshToken,
    pub refresh_expires_at: DateTime<Utc>,
}

impl Session {
    pub fn issue(user: UserIdentity, now: DateTime<Utc>, ttls: SessionTtls) -> Self {
        Self {
            access_token: AccessToken::generate(),
            user,
            access_expires_at: deadline(now, ttls.access),
            refresh_token: RefreshToken::generate(),
            refresh_expires_at: deadline(now, ttls.refresh),
        }
    }

    /// Tokens stay valid up to and including their expiry instant.
    pub fn is_access_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.access_expires_at
    }

    pub fn is_refresh_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.refresh_expires_at
    }
}

/// New access credentials produced by a rotation.
#[derive(Debug, Clone)]
pub struct AccessGrant {
    pub access_token: AccessToken,
    pub access_expires_at: DateTime<Utc>,
}

impl AccessGrant {
    pub fn mint(now: DateTime<Utc>, ttl: TimeDelta) -> Self {
        Self {
            access_token: AccessToken::generate(),
            access_expires_at: deadline(now, ttl),
        }
    }
}
