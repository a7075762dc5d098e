mod cookie;
mod error;
mod handler;
mod router;

pub use cookie::*;
pub use error::{ApiError, ApiErrorCode, recover_error};
pub use router::routes;
