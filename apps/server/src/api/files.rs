//! Generated file list and downloads.

use actix_web::{HttpRequest, HttpResponse, get, post, web};

use super::{TableView, api_session, cached_view, view_query};
use crate::auth::BackendSession;
use crate::client::ApiClient;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{FileDownload, FileRequest};
use crate::services::ViewCache;
use crate::services::download::blob_attachment;

/// Configure file routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_downloads)
        .service(request_file)
        .service(download_file)
        .service(download_scan_report);
}

/// Files generated for a scan report.
///
/// GET /scanreports/{id}/downloads
#[utoipa::path(
    get,
    path = "/api/v1/scanreports/{id}/downloads",
    tag = "Files",
    params(
        ("id" = i64, Path, description = "Scan report id"),
        ("p" = Option<u32>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<u32>, Query, description = "Rows per page (default: 20)")
    ),
    responses(
        (status = 200, description = "Page of generated files", body = TableView<FileDownload>)
    )
)]
#[get("/scanreports/{id}/downloads")]
pub async fn list_downloads(
    req: HttpRequest,
    auth: BackendSession,
    client: web::Data<ApiClient>,
    cache: web::Data<ViewCache>,
    config: web::Data<Config>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let session = api_session(&client, auth);
    let query = view_query(&req, &config);

    cached_view(&req, &cache, &session, async {
        let files = session.list_downloads(id, &query.backend_filter()).await;
        AppResult::Ok(TableView::new(files, &query, config.default_page_size, None))
    })
    .await
}

/// Ask the backend to generate a file.
///
/// POST /scanreports/{id}/downloads
#[utoipa::path(
    post,
    path = "/api/v1/scanreports/{id}/downloads",
    tag = "Files",
    params(
        ("id" = i64, Path, description = "Scan report id")
    ),
    request_body = FileRequest,
    responses(
        (status = 202, description = "Generation requested"),
        (status = 400, description = "Rejected by the backend", body = crate::error::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse)
    )
)]
#[post("/scanreports/{id}/downloads")]
pub async fn request_file(
    auth: BackendSession,
    client: web::Data<ApiClient>,
    cache: web::Data<ViewCache>,
    path: web::Path<i64>,
    body: web::Json<FileRequest>,
) -> AppResult<HttpResponse> {
    let session = api_session(&client, auth);
    session
        .request_file(&cache, path.into_inner(), body.file_type)
        .await?;
    Ok(HttpResponse::Accepted().finish())
}

/// Download a generated file.
///
/// GET /scanreports/{id}/downloads/{file_id}
#[utoipa::path(
    get,
    path = "/api/v1/scanreports/{id}/downloads/{file_id}",
    tag = "Files",
    params(
        ("id" = i64, Path, description = "Scan report id"),
        ("file_id" = i64, Path, description = "Generated file id")
    ),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = crate::error::ErrorResponse)
    )
)]
#[get("/scanreports/{id}/downloads/{file_id}")]
pub async fn download_file(
    auth: BackendSession,
    client: web::Data<ApiClient>,
    path: web::Path<(i64, i64)>,
) -> AppResult<HttpResponse> {
    let (id, file_id) = path.into_inner();
    let session = api_session(&client, auth);
    let blob = session.download_file(id, file_id).await?;
    Ok(blob_attachment(blob, &format!("scanreport-{id}-file-{file_id}")))
}

/// Download the uploaded scan report workbook.
///
/// GET /scanreports/{id}/download
#[utoipa::path(
    get,
    path = "/api/v1/scanreports/{id}/download",
    tag = "Files",
    params(
        ("id" = i64, Path, description = "Scan report id")
    ),
    responses(
        (status = 200, description = "Scan report workbook", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse),
        (status = 404, description = "Scan report not found", body = crate::error::ErrorResponse)
    )
)]
#[get("/scanreports/{id}/download")]
pub async fn download_scan_report(
    auth: BackendSession,
    client: web::Data<ApiClient>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let session = api_session(&client, auth);
    let blob = session.download_scan_report(id).await?;
    Ok(blob_attachment(blob, &format!("scanreport-{id}.xlsx")))
}
