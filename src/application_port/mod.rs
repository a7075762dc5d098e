mod identity_provider;
mod session_service;

pub use identity_provider::*;
pub use session_service::*;
