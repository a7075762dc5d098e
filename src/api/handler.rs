use super::cookie::*;
use super::error::*;
use crate::application_impl::FakeIdentityProvider;
use crate::application_port::*;
use crate::domain_model::*;
use crate::logger::*;
use crate::settings::Urls;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::header::{HeaderValue, SET_COOKIE};
use warp::http::Uri;
use warp::reply::Response;
use warp::{Reply, reject};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserIdentity,
    pub access_expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
}

fn redirect(location: &str) -> Result<Response, warp::Rejection> {
    let uri: Uri = location
        .parse()
        .map_err(ApiErrorCode::internal)
        .map_err(reject::custom)?;
    Ok(warp::redirect::found(uri).into_response())
}

fn append_cookie(response: &mut Response, cookie: &str) -> Result<(), warp::Rejection> {
    let value = HeaderValue::from_str(cookie)
        .map_err(ApiErrorCode::internal)
        .map_err(reject::custom)?;
    response.headers_mut().append(SET_COOKIE, value);
    Ok(())
}

/// Pretend to send the browser to a login provider, which immediately
/// bounces back to our callback with a code.
pub async fn start_login(urls: Arc<Urls>) -> Result<Response, warp::Rejection> {
    info!("redirecting to fake login provider");
    redirect(&urls.callback_url(FakeIdentityProvider::FAKE_CODE))
}

pub async fn complete_login(
    query: CallbackQuery,
    urls: Arc<Urls>,
    cookie_policy: Arc<CookiePolicy>,
    identity_provider: Arc<dyn IdentityProvider>,
    session_service: Arc<dyn SessionService>,
) -> Result<Response, warp::Rejection> {
    debug!("received authorization code");
    let user = identity_provider
        .resolve(&query.code)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let issued = session_service.issue(user).await;

    let mut response = redirect(&urls.dashboard_url())?;
    append_cookie(
        &mut response,
        &cookie_policy.access_cookie(issued.access_token.as_str(), issued.access_expires_at),
    )?;
    append_cookie(
        &mut response,
        &cookie_policy.refresh_cookie(issued.refresh_token.as_str(), issued.refresh_expires_at),
    )?;
    Ok(response)
}

pub async fn me(
    access_token: Option<String>,
    session_service: Arc<dyn SessionService>,
) -> Result<Response, warp::Rejection> {
    let access_token = access_token.map(AccessToken);
    let session = session_service
        .validate(access_token.as_ref())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let body = MeResponse {
        user: session.user,
        access_expires_at: session.access_expires_at,
    };
    Ok(warp::reply::json(&body).into_response())
}

pub async fn refresh(
    refresh_token: Option<String>,
    cookie_policy: Arc<CookiePolicy>,
    session_service: Arc<dyn SessionService>,
) -> Result<Response, warp::Rejection> {
    let refresh_token = refresh_token.map(RefreshToken);
    let rotated = session_service
        .rotate(refresh_token.as_ref())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let body = MessageResponse {
        message: "Access token refreshed",
    };
    let mut response = warp::reply::json(&body).into_response();
    append_cookie(
        &mut response,
        &cookie_policy.access_cookie(rotated.access_token.as_str(), rotated.access_expires_at),
    )?;
    Ok(response)
}

/// Revokes whatever lineage the cookies point at, then clears both cookies.
pub async fn logout(
    access_token: Option<String>,
    refresh_token: Option<String>,
    cookie_policy: Arc<CookiePolicy>,
    session_service: Arc<dyn SessionService>,
) -> Result<Response, warp::Rejection> {
    if let Some(token) = access_token {
        session_service.revoke(&AccessToken(token)).await;
    }
    if let Some(token) = refresh_token {
        session_service.revoke_refresh(&RefreshToken(token)).await;
    }

    let body = MessageResponse {
        message: "Logged out",
    };
    let mut response = warp::reply::json(&body).into_response();
    append_cookie(&mut response, &cookie_policy.clear_cookie(ACCESS_COOKIE_NAME))?;
    append_cookie(&mut response, &cookie_policy.clear_cookie(REFRESH_COOKIE_NAME))?;
    Ok(response)
}
