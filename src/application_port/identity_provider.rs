use crate::domain_model::UserIdentity;

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum IdentityError {
    #[error("authorization code rejected")]
    InvalidCode,
}

/// Resolves the code handed back by the login provider into a user.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, code: &str) -> Result<UserIdentity, IdentityError>;
}
