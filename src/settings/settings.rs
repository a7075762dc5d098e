use crate::domain_model::SessionTtls;
use anyhow::{Result, anyhow, bail};
use config::{Config, Environment, File};
use serde::Deserialize;
use warp::http::Uri;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub auth: Auth,
    pub cookie: Cookie,
    pub http: Http,
    pub log: Log,
    #[serde(default)]
    pub session: Session,
    pub urls: Urls,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
    pub backend: String, // "fake"
    pub placeholder_user: String,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CookieMode {
    /// Frontend and backend on different sites: `SameSite=None; Secure`.
    CrossSite,
    /// Same-site or local development: `SameSite=Lax`, no `Secure`.
    SameSite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cookie {
    pub mode: CookieMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Http {
    pub address: String,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: u64,
    #[serde(default = "default_refresh_ttl_secs")]
    pub refresh_ttl_secs: u64,
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Urls {
    pub frontend_url: String,
    pub backend_url: String,
}

fn default_access_ttl_secs() -> u64 {
    20
}

fn default_refresh_ttl_secs() -> u64 {
    300
}

fn default_cleanup_interval_secs() -> u64 {
    60
}

impl Default for Session {
    fn default() -> Self {
        Self {
            access_ttl_secs: default_access_ttl_secs(),
            refresh_ttl_secs: default_refresh_ttl_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl Session {
    pub fn ttls(&self) -> Result<SessionTtls> {
        SessionTtls::from_secs(self.access_ttl_secs, self.refresh_ttl_secs)
            .map_err(|e| anyhow!("invalid session settings: {}", e))
    }
}

impl Http {
    /// Both paths must be present to serve over TLS.
    pub fn tls_paths(&self) -> Option<(&str, &str)> {
        match (&self.cert_path, &self.key_path) {
            (Some(cert), Some(key)) => Some((cert.as_str(), key.as_str())),
            _ => None,
        }
    }
}

impl Urls {
    /// The frontend URL reduced to `scheme://authority`, as CORS expects.
    pub fn frontend_origin(&self) -> Result<String> {
        let trimmed = self.frontend_url.trim_end_matches('/');
        let uri: Uri = trimmed
            .parse()
            .map_err(|e| anyhow!("invalid frontend_url {:?}: {}", self.frontend_url, e))?;
        match (uri.scheme_str(), uri.authority()) {
            (Some(scheme), Some(authority)) if uri.path() == "/" || uri.path().is_empty() => {
                Ok(format!("{}://{}", scheme, authority))
            }
            _ => bail!(
                "frontend_url must be a bare origin like https://app.example.com, got {:?}",
                self.frontend_url
            ),
        }
    }

    pub fn dashboard_url(&self) -> String {
        format!("{}/dashboard.html", self.frontend_url.trim_end_matches('/'))
    }

    pub fn callback_url(&self, code: &str) -> String {
        format!(
            "{}/auth/callback?code={}",
            self.backend_url.trim_end_matches('/'),
            code
        )
    }
}

impl Settings {
    fn validate(&self) -> Result<()> {
        self.session.ttls()?;
        if self.session.cleanup_interval_secs == 0
            || self.session.cleanup_interval_secs > SessionTtls::MAX_SECS
        {
            bail!(
                "session.cleanup_interval_secs must be between 1 and {}",
                SessionTtls::MAX_SECS
            );
        }
        if self.http.cert_path.is_some() != self.http.key_path.is_some() {
            bail!("http.cert_path and http.key_path must be set together");
        }
        self.urls.frontend_origin()?;
        self.urls
            .backend_url
            .trim_end_matches('/')
            .parse::<Uri>()
            .map_err(|e| anyhow!("invalid backend_url {:?}: {}", self.urls.backend_url, e))?;
        Ok(())
    }
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

/// Environment variables override file values, e.g.
/// `SESSIONPAIR__URLS__FRONTEND_URL=https://app.example.com`.
const ENV_PREFIX: &str = "SESSIONPAIR";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    settings.validate()?;
    Ok(settings)
}
