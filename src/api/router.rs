use super::cookie::*;
use super::error::recover_error;
use super::handler;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let cookie_policy = Arc::new(CookiePolicy::new(
        server.cookie_mode,
        server.session_service.ttls(),
    ));

    let start_login = warp::path!("auth" / "start")
        .and(warp::get())
        .and(with(server.urls.clone()))
        .and_then(handler::start_login);

    let complete_login = warp::path!("auth" / "callback")
        .and(warp::get())
        .and(warp::query::<handler::CallbackQuery>())
        .and(with(server.urls.clone()))
        .and(with(cookie_policy.clone()))
        .and(with(server.identity_provider.clone()))
        .and(with(server.session_service.clone()))
        .and_then(handler::complete_login);

    let me = warp::path!("me")
        .and(warp::get())
        .and(warp::cookie::optional::<String>(ACCESS_COOKIE_NAME))
        .and(with(server.session_service.clone()))
        .and_then(handler::me);

    let refresh = warp::path!("refresh")
        .and(warp::post())
        .and(warp::cookie::optional::<String>(REFRESH_COOKIE_NAME))
        .and(with(cookie_policy.clone()))
        .and(with(server.session_service.clone()))
        .and_then(handler::refresh);

    let logout = warp::path!("logout")
        .and(warp::get())
        .and(warp::cookie::optional::<String>(ACCESS_COOKIE_NAME))
        .and(warp::cookie::optional::<String>(REFRESH_COOKIE_NAME))
        .and(with(cookie_policy))
        .and(with(server.session_service.clone()))
        .and_then(handler::logout);

    let cors = warp::cors()
        .allow_origin(server.frontend_origin.as_str())
        .allow_credentials(true)
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type", "authorization", "accept"]);

    start_login
        .or(complete_login)
        .or(me)
        .or(refresh)
        .or(logout)
        .recover(recover_error)
        .with(cors)
        .with(warp::trace::request())
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}
