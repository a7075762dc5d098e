use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimal identity payload attached to a session.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub username: String,
}

impl UserIdentity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.username)
    }
}
