//! OMOP destination tables and fields.

use actix_web::{HttpRequest, HttpResponse, get, web};

use super::{api_session, cached_view};
use crate::auth::BackendSession;
use crate::client::ApiClient;
use crate::error::AppResult;
use crate::models::{OmopField, OmopTable};
use crate::services::ViewCache;

/// Configure OMOP routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_omop_tables)
        .service(list_omop_fields)
        .service(get_omop_table);
}

#[utoipa::path(
    get,
    path = "/api/v1/omop/tables",
    tag = "OMOP",
    responses(
        (status = 200, description = "OMOP CDM tables", body = Vec<OmopTable>)
    )
)]
#[get("/omop/tables")]
pub async fn list_omop_tables(
    req: HttpRequest,
    auth: BackendSession,
    client: web::Data<ApiClient>,
    cache: web::Data<ViewCache>,
) -> AppResult<HttpResponse> {
    let session = api_session(&client, auth);
    cached_view(&req, &cache, &session, async {
        AppResult::Ok(session.get_omop_tables().await)
    })
    .await
}

/// A single OMOP table; zeroed when the backend does not know it.
#[utoipa::path(
    get,
    path = "/api/v1/omop/tables/{name}",
    tag = "OMOP",
    params(
        ("name" = String, Path, description = "OMOP table name")
    ),
    responses(
        (status = 200, description = "OMOP CDM table", body = OmopTable)
    )
)]
#[get("/omop/tables/{name}")]
pub async fn get_omop_table(
    req: HttpRequest,
    auth: BackendSession,
    client: web::Data<ApiClient>,
    cache: web::Data<ViewCache>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let name = path.into_inner();
    let session = api_session(&client, auth);
    cached_view(&req, &cache, &session, async {
        AppResult::Ok(session.get_omop_table(&name).await)
    })
    .await
}

#[utoipa::path(
    get,
    path = "/api/v1/omop/fields",
    tag = "OMOP",
    responses(
        (status = 200, description = "OMOP CDM fields", body = Vec<OmopField>)
    )
)]
#[get("/omop/fields")]
pub async fn list_omop_fields(
    req: HttpRequest,
    auth: BackendSession,
    client: web::Data<ApiClient>,
    cache: web::Data<ViewCache>,
) -> AppResult<HttpResponse> {
    let session = api_session(&client, auth);
    cached_view(&req, &cache, &session, async {
        AppResult::Ok(session.get_omop_fields().await)
    })
    .await
}
