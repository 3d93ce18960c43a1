//! Bearer token extraction

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{self, HeaderMap};
use actix_web::middleware::Next;
use actix_web::{Error, HttpMessage};

/// Token passed with `Authorization: Bearer <token>` header
#[derive(Debug, Clone, PartialEq)]
pub struct BearerToken(pub String);

/// Attaches the bearer token to the request extensions if present
///
/// The token is not validated here, handlers decide how to treat an unknown token.
pub async fn middleware<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    if let Some(token) = bearer_token(req.headers()) {
        req.extensions_mut().insert(token);
    }

    next.call(req).await
}

/// Extracts token from the `Authorization` header
///
/// The `Bearer ` scheme prefix is optional - without it the whole header value is taken as the
/// token. Empty or non visible ASCII values are treated as no token at all.
fn bearer_token(headers: &HeaderMap) -> Option<BearerToken> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value);

    (!token.is_empty()).then(|| BearerToken(token.to_owned()))
}
