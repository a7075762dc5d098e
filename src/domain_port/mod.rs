mod clock;
mod session_store;

pub use clock::*;
pub use session_store::*;
