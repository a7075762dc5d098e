use crate::domain_model::SessionTtls;
use crate::settings::CookieMode;
use chrono::{DateTime, TimeDelta, Utc};

pub const ACCESS_COOKIE_NAME: &str = "access_token";
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";
pub const COOKIE_PATH: &str = "/";
const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SameSite {
    Lax,
    None,
}

/// Attributes shared by every session cookie the server sets or clears.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    pub secure: bool,
    pub same_site: SameSite,
    pub ttls: SessionTtls,
}

impl CookiePolicy {
    pub fn new(mode: CookieMode, ttls: SessionTtls) -> Self {
        match mode {
            // Browsers drop SameSite=None cookies that are not Secure.
            CookieMode::CrossSite => Self {
                secure: true,
                same_site: SameSite::None,
                ttls,
            },
            CookieMode::SameSite => Self {
                secure: false,
                same_site: SameSite::Lax,
                ttls,
            },
        }
    }

    pub fn access_cookie(&self, value: &str, expires_at: DateTime<Utc>) -> String {
        self.build(ACCESS_COOKIE_NAME, value, self.ttls.access(), expires_at)
    }

    pub fn refresh_cookie(&self, value: &str, expires_at: DateTime<Utc>) -> String {
        self.build(REFRESH_COOKIE_NAME, value, self.ttls.refresh(), expires_at)
    }

    pub fn clear_cookie(&self, name: &str) -> String {
        self.build(name, "", TimeDelta::zero(), DateTime::<Utc>::default())
    }

    // Max-Age takes precedence over Expires where both are understood.
    fn build(
        &self,
        name: &str,
        value: &str,
        max_age: TimeDelta,
        expires_at: DateTime<Utc>,
    ) -> String {
        let mut cookie = format!(
            "{}={}; Path={}; Max-Age={}; Expires={}; HttpOnly; SameSite={}",
            name,
            value,
            COOKIE_PATH,
            max_age.num_seconds(),
            expires_at.format(HTTP_DATE),
            same_site_value(self.same_site)
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

fn same_site_value(same_site: SameSite) -> &'static str {
    match same_site {
        SameSite::Lax => "Lax",
        SameSite::None => "None",
    }
}
