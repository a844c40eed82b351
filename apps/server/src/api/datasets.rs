//! Dataset views.

use actix_web::{HttpRequest, HttpResponse, get, patch, web};
use serde::Serialize;
use utoipa::ToSchema;

use super::scan_reports::ArchiveRequest;
use super::{TableView, api_session, cached_view, view_query};
use crate::auth::BackendSession;
use crate::client::ApiClient;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{DataSet, PermissionsResponse, Project};
use crate::services::ViewCache;

/// Dataset detail view.
#[derive(Debug, Serialize, ToSchema)]
pub struct DataSetDetailView {
    pub dataset: DataSet,
    pub data_partner: Option<String>,
    pub permissions: PermissionsResponse,
    /// Projects the dataset belongs to.
    pub projects: Vec<Project>,
}

/// Configure dataset routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_data_sets)
        .service(archive_data_set)
        .service(get_data_set_detail);
}

/// List datasets with their data partners.
///
/// GET /datasets?p=1&name__icontains=..&hidden=false
#[utoipa::path(
    get,
    path = "/api/v1/datasets",
    tag = "Datasets",
    params(
        ("p" = Option<u32>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<u32>, Query, description = "Rows per page (default: 20)"),
        ("ordering" = Option<String>, Query, description = "Sort column, `-` prefix for descending"),
        ("name__icontains" = Option<String>, Query, description = "Dataset name filter"),
        ("hidden" = Option<bool>, Query, description = "Archived tab (default: false)")
    ),
    responses(
        (status = 200, description = "Page of datasets", body = TableView<DataSet>)
    )
)]
#[get("/datasets")]
pub async fn list_data_sets(
    req: HttpRequest,
    auth: BackendSession,
    client: web::Data<ApiClient>,
    cache: web::Data<ViewCache>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let session = api_session(&client, auth);
    let query = view_query(&req, &config);

    cached_view(&req, &cache, &session, async {
        let datasets = session.get_data_sets(&query.backend_filter()).await;
        AppResult::Ok(TableView::new(
            datasets,
            &query,
            config.default_page_size,
            Some("name"),
        ))
    })
    .await
}

/// Dataset detail with permissions and projects.
///
/// GET /datasets/{id}
#[utoipa::path(
    get,
    path = "/api/v1/datasets/{id}",
    tag = "Datasets",
    params(
        ("id" = i64, Path, description = "Dataset id")
    ),
    responses(
        (status = 200, description = "Dataset detail", body = DataSetDetailView),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse),
        (status = 404, description = "Dataset not found", body = crate::error::ErrorResponse)
    )
)]
#[get("/datasets/{id}")]
pub async fn get_data_set_detail(
    req: HttpRequest,
    auth: BackendSession,
    client: web::Data<ApiClient>,
    cache: web::Data<ViewCache>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let session = api_session(&client, auth);

    let dataset_id = id.to_string();

    cached_view(&req, &cache, &session, async {
        let dataset = session.get_data_set(id).await?;
        let (permissions, projects) = tokio::join!(
            session.get_data_set_permissions(id),
            session.get_projects_for_dataset(&dataset_id),
        );

        AppResult::Ok(DataSetDetailView {
            data_partner: dataset.data_partner_name().map(str::to_string),
            dataset,
            permissions,
            projects,
        })
    })
    .await
}

/// Move a dataset to or from the archive.
///
/// PATCH /datasets/{id}/archive
#[utoipa::path(
    patch,
    path = "/api/v1/datasets/{id}/archive",
    tag = "Datasets",
    params(
        ("id" = i64, Path, description = "Dataset id")
    ),
    request_body = ArchiveRequest,
    responses(
        (status = 204, description = "Archive state updated"),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse)
    )
)]
#[patch("/datasets/{id}/archive")]
pub async fn archive_data_set(
    auth: BackendSession,
    client: web::Data<ApiClient>,
    cache: web::Data<ViewCache>,
    path: web::Path<i64>,
    body: web::Json<ArchiveRequest>,
) -> AppResult<HttpResponse> {
    let session = api_session(&client, auth);
    session
        .archive_data_set(&cache, path.into_inner(), body.hidden)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
