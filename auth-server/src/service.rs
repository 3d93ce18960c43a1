//! HTTP API of the service

use actix_web::web::{Data, Json, ServiceConfig};
use actix_web::{HttpMessage, HttpRequest, Result, get, middleware, post, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};


mod error;
mod session;

use crate::model::Model;
use crate::model::auth;
use crate::model::session::{SessionRecord, Token, format_timestamp};
use crate::model::users::PublicUser;
use error::ApiError;
use session::BearerToken;

/// Routes exposed by the service
pub const ENDPOINTS: &[&str] = &[
    "POST /api/auth/login",
    "POST /api/auth/verify",
    "POST /api/auth/logout",
    "GET /api/user/info",
    "GET /api/health",
];

/// Successful response envelope
#[derive(Debug, Serialize)]
struct Success<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T> Success<T> {
    fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

impl Success<()> {
    fn message(message: &'static str) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenRequest {
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginData {
    token: Token,
    user: PublicUser,
}

#[derive(Debug, Serialize)]
struct UserData {
    user: SessionRecord,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Health {
    status: &'static str,
    timestamp: String,
    active_sessions: usize,
}

/// Logs user in with username and password
///
/// Missing or malformed body is treated as no credentials given.
#[post("/auth/login")]
async fn login(
    model: Data<Model>,
    body: Option<Json<LoginRequest>>,
) -> Result<Json<Success<LoginData>>, ApiError> {
    let body = body.map(Json::into_inner).unwrap_or_default();
    let auth::Login { token, user } = model
        .login(body.username.as_deref(), body.password.as_deref())
        .await?;

    Ok(Json(
        Success::data(LoginData { token, user }).with_message("Login successful"),
    ))
}

/// Returns the session for a token given in the body
#[post("/auth/verify")]
async fn verify(
    model: Data<Model>,
    body: Option<Json<TokenRequest>>,
) -> Result<Json<Success<UserData>>, ApiError> {
    let body = body.map(Json::into_inner).unwrap_or_default();
    let user = model.verify(body.token.as_deref()).await?;
    Ok(Json(Success::data(UserData { user })))
}

/// Closes the session. Succeeds even if the token is missing or unknown.
#[post("/auth/logout")]
async fn logout(
    model: Data<Model>,
    body: Option<Json<TokenRequest>>,
) -> Result<Json<Success<()>>, ApiError> {
    let body = body.map(Json::into_inner).unwrap_or_default();
    model.logout(body.token.as_deref()).await?;
    Ok(Json(Success::message("Logout successful")))
}

/// Returns the session for a token given in the `Authorization` header
#[get("/user/info")]
async fn user_info(
    req: HttpRequest,
    model: Data<Model>,
) -> Result<Json<Success<UserData>>, ApiError> {
    let BearerToken(token) = req
        .extensions()
        .get::<BearerToken>()
        .cloned()
        .ok_or(ApiError::NoToken)?;

    let user = model
        .verify(Some(token.as_str()))
        .await
        .map_err(|err| match err {
            auth::Error::MissingToken => ApiError::NoToken,
            auth::Error::InvalidToken => ApiError::InvalidBearerToken,
            err => err.into(),
        })?;

    Ok(Json(Success::data(UserData { user })))
}

#[get("/health")]
async fn health(model: Data<Model>) -> Result<Json<Health>, ApiError> {
    Ok(Json(Health {
        status: "OK",
        timestamp: format_timestamp(&Utc::now()),
        active_sessions: model.active_sessions().await?,
    }))
}

/// Returns configuration function for the ActixWeb services
pub fn configure(context: Model) -> impl Fn(&mut ServiceConfig) + Clone {
    move |cfg: &mut ServiceConfig| {
        let api = web::scope("/api")
            .wrap(middleware::from_fn(session::middleware))
            .service(login)
            .service(verify)
            .service(logout)
            .service(user_info)
            .service(health);

        cfg.app_data(Data::new(context.clone())).service(api);
    }
}
