//! Settings are read from a TOML file chosen on the command line, then
//! overridden by `SESSIONPAIR__*` environment variables.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
