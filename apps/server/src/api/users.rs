//! Signed-in user and user pickers.

use actix_web::{HttpResponse, get, web};
use tracing::info;

use super::api_session;
use crate::auth::BackendSession;
use crate::client::ApiClient;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::User;

/// Configure user routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(current_user).service(list_users);
}

/// The signed-in user.
///
/// A rejected session sends the browser to the login page.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    tag = "Users",
    responses(
        (status = 200, description = "Signed-in user", body = User),
        (status = 303, description = "Session rejected, redirect to login"),
        (status = 401, description = "No backend session", body = crate::error::ErrorResponse)
    )
)]
#[get("/me")]
pub async fn current_user(
    auth: BackendSession,
    client: web::Data<ApiClient>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let session = api_session(&client, auth);
    match session.get_current_user().await {
        Ok(user) => Ok(HttpResponse::Ok().json(user)),
        Err(e) => {
            info!(error = %e, "Session rejected, redirecting to login");
            Err(AppError::LoginRequired {
                login_url: config.login_path.clone(),
            })
        }
    }
}

/// Active users, for membership pickers.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    responses(
        (status = 200, description = "Active users", body = Vec<User>)
    )
)]
#[get("/users")]
pub async fn list_users(
    auth: BackendSession,
    client: web::Data<ApiClient>,
) -> AppResult<HttpResponse> {
    let session = api_session(&client, auth);
    Ok(HttpResponse::Ok().json(session.get_users().await))
}
