use crate::application_port::*;
use crate::domain_model::UserIdentity;

/// Stand-in for a real login provider: any non-empty code resolves to the
/// configured placeholder user.
#[derive(Debug)]
pub struct FakeIdentityProvider {
    placeholder: UserIdentity,
}

impl FakeIdentityProvider {
    pub const FAKE_CODE: &'static str = "fake_oauth_code";

    pub fn new(placeholder_username: impl Into<String>) -> Self {
        Self {
            placeholder: UserIdentity::new(placeholder_username),
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn resolve(&self, code: &str) -> Result<UserIdentity, IdentityError> {
        if code.trim().is_empty() {
            return Err(IdentityError::InvalidCode);
        }
        Ok(self.placeholder.clone())
    }
}
