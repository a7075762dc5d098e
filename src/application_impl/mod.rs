mod identity_provider_fake;
mod session_service_impl;

pub use identity_provider_fake::*;
pub use session_service_impl::*;
