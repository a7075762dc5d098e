use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let (code, message) = if let Some(code) = err.find::<ApiErrorCode>() {
        (*code, code.to_string())
    } else if err.is_not_found() {
        (ApiErrorCode::NotFound, ApiErrorCode::NotFound.to_string())
    } else if let Some(e) = err.find::<reject::InvalidQuery>() {
        (ApiErrorCode::InvalidAuthCode, e.to_string())
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        (
            ApiErrorCode::MethodNotAllowed,
            ApiErrorCode::MethodNotAllowed.to_string(),
        )
    } else {
        warn!("Unhandled rejection: {:?}", err);
        (
            ApiErrorCode::InternalError,
            ApiErrorCode::InternalError.to_string(),
        )
    };

    let json = warp::reply::json(&ApiError { code, message });
    Ok(warp::reply::with_status(json, code.status()))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Access token expired")]
    AccessExpired,
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
    #[error("Refresh token expired")]
    RefreshExpired,
    #[error("Missing or invalid authorization code")]
    InvalidAuthCode,
    #[error("Not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::Unauthorized
            | ApiErrorCode::AccessExpired
            | ApiErrorCode::InvalidRefreshToken
            | ApiErrorCode::RefreshExpired => StatusCode::UNAUTHORIZED,
            ApiErrorCode::InvalidAuthCode => StatusCode::BAD_REQUEST,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<SessionError> for ApiErrorCode {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Unauthorized => ApiErrorCode::Unauthorized,
            SessionError::AccessExpired => ApiErrorCode::AccessExpired,
            SessionError::InvalidRefreshToken => ApiErrorCode::InvalidRefreshToken,
            SessionError::RefreshExpired => ApiErrorCode::RefreshExpired,
        }
    }
}

impl From<IdentityError> for ApiErrorCode {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::InvalidCode => ApiErrorCode::InvalidAuthCode,
        }
    }
}
