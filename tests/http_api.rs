use chrono::{DateTime, TimeZone, Utc};
use sessionpair::api;
use sessionpair::application_port::SessionService;
use sessionpair::domain_port::ManualClock;
use sessionpair::server::Server;
use sessionpair::settings::*;
use std::sync::Arc;
use std::time::Duration;
use warp::http::StatusCode;
use warp::http::header::{LOCATION, SET_COOKIE};
use warp::hyper::body::Bytes;

const FRONTEND: &str = "https://app.example.com";
const BACKEND: &str = "https://api.example.com";

fn settings(mode: CookieMode) -> Settings {
    Settings {
        auth: Auth {
            backend: "fake".to_string(),
            placeholder_user: "raghav".to_string(),
        },
        cookie: Cookie { mode },
        http: Http {
            address: "127.0.0.1:0".to_string(),
            cert_path: None,
            key_path: None,
        },
        log: Log {
            filter: "info".to_string(),
        },
        session: Session::default(),
        urls: Urls {
            frontend_url: FRONTEND.to_string(),
            backend_url: BACKEND.to_string(),
        },
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn server(mode: CookieMode) -> (Arc<Server>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let server = Server::try_with_clock(&settings(mode), clock.clone()).unwrap();
    (Arc::new(server), clock)
}

fn set_cookies(response: &warp::http::Response<Bytes>) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

fn cookie_value(set_cookies: &[String], name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies.iter().find_map(|c| {
        let pair = c.split(';').next()?;
        pair.strip_prefix(&prefix).map(str::to_string)
    })
}

fn json(response: &warp::http::Response<Bytes>) -> serde_json::Value {
    serde_json::from_slice(response.body()).unwrap()
}

/// Runs the callback and returns (access_token, refresh_token).
async fn login(server: &Arc<Server>) -> (String, String) {
    let routes = api::routes(server.clone());
    let response = warp::test::request()
        .method("GET")
        .path("/auth/callback?code=fake_oauth_code")
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    let cookies = set_cookies(&response);
    (
        cookie_value(&cookies, "access_token").unwrap(),
        cookie_value(&cookies, "refresh_token").unwrap(),
    )
}

async fn get_me(server: &Arc<Server>, access: &str) -> warp::http::Response<Bytes> {
    warp::test::request()
        .method("GET")
        .path("/me")
        .header("cookie", format!("access_token={}", access))
        .reply(&api::routes(server.clone()))
        .await
}

async fn post_refresh(server: &Arc<Server>, refresh: &str) -> warp::http::Response<Bytes> {
    warp::test::request()
        .method("POST")
        .path("/refresh")
        .header("cookie", format!("refresh_token={}", refresh))
        .reply(&api::routes(server.clone()))
        .await
}

#[tokio::test]
async fn start_redirects_to_callback_with_fake_code() {
    let (server, _) = server(CookieMode::CrossSite);
    let response = warp::test::request()
        .method("GET")
        .path("/auth/start")
        .reply(&api::routes(server))
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[LOCATION],
        "https://api.example.com/auth/callback?code=fake_oauth_code"
    );
}

#[tokio::test]
async fn callback_sets_both_cookies_and_redirects_to_dashboard() {
    let (server, _) = server(CookieMode::CrossSite);
    let response = warp::test::request()
        .method("GET")
        .path("/auth/callback?code=fake_oauth_code")
        .reply(&api::routes(server))
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[LOCATION],
        "https://app.example.com/dashboard.html"
    );

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    let access = cookies.iter().find(|c| c.starts_with("access_token=")).unwrap();
    assert!(access.contains("Max-Age=20"));
    assert!(access.contains("Expires=Mon, 01 Jan 2024 00:00:20 GMT"));
    assert!(access.contains("HttpOnly"));
    assert!(access.contains("Path=/"));
    assert!(access.contains("SameSite=None"));
    assert!(access.contains("Secure"));
    let refresh = cookies.iter().find(|c| c.starts_with("refresh_token=")).unwrap();
    assert!(refresh.contains("Max-Age=300"));
    assert!(refresh.contains("Expires=Mon, 01 Jan 2024 00:05:00 GMT"));
}

#[tokio::test]
async fn same_site_mode_uses_lax_cookies() {
    let (server, _) = server(CookieMode::SameSite);
    let response = warp::test::request()
        .method("GET")
        .path("/auth/callback?code=abc")
        .reply(&api::routes(server))
        .await;

    for cookie in set_cookies(&response) {
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Secure"));
    }
}

#[tokio::test]
async fn callback_without_code_is_bad_request() {
    let (server, _) = server(CookieMode::CrossSite);
    let response = warp::test::request()
        .method("GET")
        .path("/auth/callback")
        .reply(&api::routes(server))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(&response)["code"], "InvalidAuthCode");
}

#[tokio::test]
async fn callback_with_blank_code_is_bad_request() {
    let (server, _) = server(CookieMode::CrossSite);
    let response = warp::test::request()
        .method("GET")
        .path("/auth/callback?code=")
        .reply(&api::routes(server.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json(&response);
    assert_eq!(body["code"], "InvalidAuthCode");
    assert!(set_cookies(&response).is_empty());
    assert_eq!(server.session_service.session_count().await, 0);
}

#[tokio::test]
async fn me_returns_user_and_expiry() {
    let (server, clock) = server(CookieMode::CrossSite);
    let (access, _) = login(&server).await;

    clock.advance(Duration::from_secs(10));
    let response = get_me(&server, &access).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json(&response);
    assert_eq!(body["user"]["username"], "raghav");
    assert_eq!(body["access_expires_at"], "2024-01-01T00:00:20Z");
}

#[tokio::test]
async fn me_without_cookie_is_unauthorized() {
    let (server, _) = server(CookieMode::CrossSite);
    let response = warp::test::request()
        .method("GET")
        .path("/me")
        .reply(&api::routes(server))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json(&response);
    assert_eq!(body["code"], "Unauthorized");
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn expiry_and_refresh_scenario() {
    let (server, clock) = server(CookieMode::CrossSite);
    let (access, refresh) = login(&server).await;

    clock.set(t0() + chrono::Duration::seconds(25));
    let response = get_me(&server, &access).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json(&response)["code"], "AccessExpired");

    let response = post_refresh(&server, &refresh).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(&response)["message"], "Access token refreshed");
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    let new_access = cookie_value(&cookies, "access_token").unwrap();
    assert_ne!(new_access, access);
    assert!(cookies[0].contains("Expires=Mon, 01 Jan 2024 00:00:45 GMT"));

    clock.set(t0() + chrono::Duration::seconds(26));
    assert_eq!(get_me(&server, &new_access).await.status(), StatusCode::OK);

    clock.set(t0() + chrono::Duration::seconds(310));
    let response = post_refresh(&server, &refresh).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json(&response)["code"], "RefreshExpired");
}

#[tokio::test]
async fn refresh_failures_are_unauthorized() {
    let (server, _) = server(CookieMode::CrossSite);

    let response = warp::test::request()
        .method("POST")
        .path("/refresh")
        .reply(&api::routes(server.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json(&response)["code"], "Unauthorized");

    let response = post_refresh(&server, "refresh-unknown").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json(&response)["code"], "InvalidRefreshToken");
}

#[tokio::test]
async fn logout_clears_cookies_and_revokes_session() {
    let (server, _) = server(CookieMode::CrossSite);
    let (access, refresh) = login(&server).await;

    let response = warp::test::request()
        .method("GET")
        .path("/logout")
        .header(
            "cookie",
            format!("access_token={}; refresh_token={}", access, refresh),
        )
        .reply(&api::routes(server.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(&response)["message"], "Logged out");
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));

    assert_eq!(get_me(&server, &access).await.status(), StatusCode::UNAUTHORIZED);
    let response = post_refresh(&server, &refresh).await;
    assert_eq!(json(&response)["code"], "InvalidRefreshToken");
}

#[tokio::test]
async fn logout_without_cookies_still_succeeds() {
    let (server, _) = server(CookieMode::SameSite);
    let response = warp::test::request()
        .method("GET")
        .path("/logout")
        .reply(&api::routes(server))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_and_wrong_method() {
    let (server, _) = server(CookieMode::CrossSite);

    let response = warp::test::request()
        .method("GET")
        .path("/nope")
        .reply(&api::routes(server.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = warp::test::request()
        .method("GET")
        .path("/refresh")
        .reply(&api::routes(server))
        .await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn cors_preflight_allows_frontend_origin_with_credentials() {
    let (server, _) = server(CookieMode::CrossSite);
    let response = warp::test::request()
        .method("OPTIONS")
        .path("/refresh")
        .header("origin", FRONTEND)
        .header("access-control-request-method", "POST")
        .reply(&api::routes(server.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], FRONTEND);
    assert_eq!(headers["access-control-allow-credentials"], "true");

    let response = warp::test::request()
        .method("OPTIONS")
        .path("/refresh")
        .header("origin", "https://evil.example.com")
        .header("access-control-request-method", "POST")
        .reply(&api::routes(server))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn shutdown_stops_the_sweeper() {
    let (server, _) = server(CookieMode::CrossSite);
    login(&server).await;
    tokio::time::timeout(Duration::from_secs(5), server.shutdown())
        .await
        .unwrap();
}
