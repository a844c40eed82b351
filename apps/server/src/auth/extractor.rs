//! Actix-web extractor for the browser's backend credentials.
//!
//! # Security
//! - Cookie and header values are wrapped in `SecretString` immediately
//! - Secret values are never logged or exposed in debug output

use actix_web::dev::Payload;
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use std::future::{Ready, ready};

use super::Credentials;
use crate::config::{CSRF_COOKIE, Config, SESSION_COOKIE, defaults};
use crate::error::ErrorResponse;

/// Authentication error for extractors.
#[derive(Debug)]
pub struct AuthError {
    message: String,
    login_url: String,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::UNAUTHORIZED)
            .insert_header((header::LOCATION, self.login_url.clone()))
            .json(ErrorResponse {
                error: "UNAUTHORIZED".to_string(),
                message: self.message.clone(),
            })
    }
}

/// Bearer token from the `Authorization` header, if any.
fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Extractor that requires backend credentials on the incoming request.
///
/// A Django `sessionid` cookie wins over a bearer token when both are sent.
/// ```ignore
/// async fn handler(session: BackendSession) -> impl Responder {
///     // session.credentials is forwarded to the backend
/// }
/// ```
pub struct BackendSession {
    pub credentials: Credentials,
}

impl BackendSession {
    /// Credentials on `req`, if any. Shared with the request logger.
    pub(crate) fn from_http_request(req: &HttpRequest) -> Option<Credentials> {
        if let Some(session) = req.cookie(SESSION_COOKIE) {
            let session_id = session.value().to_string();
            if !session_id.is_empty() {
                let csrf = req.cookie(CSRF_COOKIE).map(|c| c.value().to_string());
                return Some(Credentials::session(session_id, csrf));
            }
        }

        bearer_token(req).map(Credentials::bearer)
    }
}

impl FromRequest for BackendSession {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match Self::from_http_request(req) {
            Some(credentials) => ready(Ok(BackendSession { credentials })),
            None => {
                let login_url = req
                    .app_data::<web::Data<Config>>()
                    .map(|c| c.login_path.clone())
                    .unwrap_or_else(|| defaults::LOGIN_PATH.to_string());

                ready(Err(AuthError {
                    message: "Missing session. Sign in or provide a bearer token.".to_string(),
                    login_url,
                }))
            }
        }
    }
}
