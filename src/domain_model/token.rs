use serde::{Deserialize, Serialize};
use std::fmt;

const ACCESS_PREFIX: &str = "access-";
const REFRESH_PREFIX: &str = "refresh-";

/// Opaque short-lived token carried in the `access_token` cookie.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(pub String);

/// Opaque long-lived token carried in the `refresh_token` cookie.
/// Identifies a session lineage.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshToken(pub String);

impl AccessToken {
    pub fn generate() -> Self {
        Self(format!("{}{}", ACCESS_PREFIX, uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl RefreshToken {
    pub fn generate() -> Self {
        Self(format!("{}{}", REFRESH_PREFIX, uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are credentials; keep them out of Debug output and logs.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshToken(..)")
    }
}
