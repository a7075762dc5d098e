use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "sessionpair", about = "Cookie-based access/refresh session server")]
pub struct Cli {
    /// Path to a TOML settings file. Defaults to `settings/dev.toml`
    /// (debug builds) or `settings/release.toml`.
    #[arg(long)]
    pub settings: Option<String>,
}
