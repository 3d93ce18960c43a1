//! API failure responses

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::model::auth;

/// Request rejection reported to the client
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Username and password are required")]
    MissingCredentials,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Token is required")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Unauthorized")]
    NoToken,
    /// Unknown token passed through the `Authorization` header
    #[error("Invalid token")]
    InvalidBearerToken,
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    /// Machine readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "MISSING_CREDENTIALS",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidToken | Self::InvalidBearerToken => "INVALID_TOKEN",
            Self::NoToken => "NO_TOKEN",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
struct Failure {
    success: bool,
    message: String,
    code: &'static str,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCredentials | Self::MissingToken => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials
            | Self::InvalidToken
            | Self::NoToken
            | Self::InvalidBearerToken => StatusCode::UNAUTHORIZED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(Failure {
            success: false,
            message: self.to_string(),
            code: self.code(),
        })
    }
}

impl From<auth::Error> for ApiError {
    fn from(err: auth::Error) -> Self {
        match err {
            auth::Error::MissingCredentials => Self::MissingCredentials,
            auth::Error::InvalidCredentials => Self::InvalidCredentials,
            auth::Error::MissingToken => Self::MissingToken,
            auth::Error::InvalidToken => Self::InvalidToken,
            auth::Error::Store(err) => {
                error!(?err, "Session store failure");
                Self::Internal
            }
        }
    }
}
