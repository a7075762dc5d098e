//! Tracing setup plus re-exports of the `tracing` macros used across the
//! crate.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
