//! Scan report, table and field views.

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{TableView, api_session, cached_view, view_query};
use crate::auth::BackendSession;
use crate::client::{ApiClient, ApiSession};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{
    GeneralStatus, Job, PaginatedResponse, PermissionsResponse, ScanReport, ScanReportField,
    ScanReportFieldUpdate, ScanReportTable, ScanReportTableUpdate, ScanReportValue,
};
use crate::services::{
    ConceptRow, ConceptTableState, HasObjectId, ViewCache, divide_jobs, general_status, jobs_by_table,
};

/// Body of the archive toggles.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ArchiveRequest {
    /// `true` moves the record to the archived tab.
    pub hidden: bool,
}

/// Jobs of one table, rolled up.
#[derive(Debug, Serialize, ToSchema)]
pub struct JobSummary {
    pub general_status: GeneralStatus,
    /// Human readable status shown in the jobs column.
    #[schema(value_type = String)]
    pub status_label: &'static str,
    pub jobs: Vec<Job>,
    /// Completed runs of three jobs each, oldest job first.
    pub runs: Vec<Vec<Job>>,
}

impl JobSummary {
    fn new(jobs: Vec<Job>) -> Self {
        let status = general_status(&jobs);
        Self {
            general_status: status,
            status_label: status.label(),
            runs: divide_jobs(jobs.clone()),
            jobs,
        }
    }
}

/// A table row of the scan report detail view.
#[derive(Debug, Serialize, ToSchema)]
pub struct TableWithJobs {
    #[serde(flatten)]
    pub table: ScanReportTable,
    #[serde(flatten)]
    pub jobs: JobSummary,
}

/// Scan report detail view.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScanReportDetailView {
    pub scan_report: ScanReport,
    pub permissions: PermissionsResponse,
    pub tables: TableView<TableWithJobs>,
}

/// Jobs of a scan report grouped by table.
#[derive(Debug, Serialize, ToSchema)]
pub struct TableJobs {
    pub scan_report_table_id: i64,
    #[serde(flatten)]
    pub jobs: JobSummary,
}

/// Fields table view.
#[derive(Debug, Serialize)]
pub struct FieldsView {
    pub table: ScanReportTable,
    pub permissions: PermissionsResponse,
    /// The session may add or remove concepts.
    pub can_edit: bool,
    /// Concepts can be added once person id and date event are set.
    pub ready_for_concepts: bool,
    pub fields: TableView<ConceptRow<ScanReportField>>,
}

/// Values table view.
#[derive(Debug, Serialize)]
pub struct ValuesView {
    pub table: ScanReportTable,
    pub field: ScanReportField,
    pub permissions: PermissionsResponse,
    pub can_edit: bool,
    pub ready_for_concepts: bool,
    pub values: TableView<ConceptRow<ScanReportValue>>,
}

/// Configure scan report routes.
/// Note: More specific routes must be registered before generic ones.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_scan_reports)
        .service(archive_scan_report)
        .service(get_scan_report_jobs)
        .service(get_table_jobs)
        .service(get_field_values)
        .service(update_field)
        .service(get_table_fields)
        .service(update_table)
        .service(delete_scan_report)
        .service(get_scan_report_detail);
}

/// Attach concepts and permissions to a page of fields or values.
async fn annotate_page<T: HasObjectId>(
    session: &ApiSession,
    page: PaginatedResponse<T>,
    permissions: &PermissionsResponse,
) -> PaginatedResponse<ConceptRow<T>> {
    let object_ids: Vec<i64> = page.results.iter().map(HasObjectId::object_id).collect();
    let mut state = ConceptTableState::new(
        session.get_scan_report_concepts_for(&object_ids).await,
        Vec::new(),
    );
    state.concepts = session
        .get_all_concepts_filtered(&state.needed_concept_ids())
        .await;

    let PaginatedResponse {
        count,
        next,
        previous,
        results,
    } = page;
    PaginatedResponse {
        count,
        next,
        previous,
        results: state.compose(results, permissions),
    }
}

/// List scan reports.
///
/// GET /scanreports?p=1&page_size=20&dataset__icontains=..&hidden=false
#[utoipa::path(
    get,
    path = "/api/v1/scanreports",
    tag = "Scan Reports",
    params(
        ("p" = Option<u32>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<u32>, Query, description = "Rows per page (default: 20)"),
        ("ordering" = Option<String>, Query, description = "Sort column, `-` prefix for descending"),
        ("dataset__icontains" = Option<String>, Query, description = "Dataset name filter"),
        ("mapping_status__value__in" = Option<String>, Query, description = "Comma separated mapping statuses"),
        ("hidden" = Option<bool>, Query, description = "Archived tab (default: false)")
    ),
    responses(
        (status = 200, description = "Page of scan reports", body = TableView<ScanReport>),
        (status = 401, description = "No backend session", body = crate::error::ErrorResponse)
    )
)]
#[get("/scanreports")]
pub async fn list_scan_reports(
    req: HttpRequest,
    auth: BackendSession,
    client: web::Data<ApiClient>,
    cache: web::Data<ViewCache>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let session = api_session(&client, auth);
    let query = view_query(&req, &config);

    cached_view(&req, &cache, &session, async {
        let page = session.get_scan_reports(&query.backend_filter()).await;
        AppResult::Ok(TableView::new(
            page,
            &query,
            config.default_page_size,
            Some("dataset"),
        ))
    })
    .await
}

/// Scan report detail: tables with their jobs.
///
/// GET /scanreports/{id}
#[utoipa::path(
    get,
    path = "/api/v1/scanreports/{id}",
    tag = "Scan Reports",
    params(
        ("id" = i64, Path, description = "Scan report id"),
        ("p" = Option<u32>, Query, description = "Page number (default: 1)"),
        ("name__icontains" = Option<String>, Query, description = "Table name filter")
    ),
    responses(
        (status = 200, description = "Scan report detail", body = ScanReportDetailView),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse),
        (status = 404, description = "Scan report not found", body = crate::error::ErrorResponse)
    )
)]
#[get("/scanreports/{id}")]
pub async fn get_scan_report_detail(
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
        let scan_report = session.get_scan_report(id).await?;
        let filter = query.backend_filter();
        let (permissions, tables, jobs) = tokio::join!(
            session.get_scan_report_permissions(id),
            session.get_scan_report_tables(id, &filter),
            session.get_jobs(id),
        );

        let mut grouped = jobs_by_table(jobs);
        let tables = tables.map(|table| {
            let jobs = grouped.remove(&table.id).unwrap_or_default();
            TableWithJobs {
                table,
                jobs: JobSummary::new(jobs),
            }
        });

        AppResult::Ok(ScanReportDetailView {
            scan_report,
            permissions,
            tables: TableView::new(tables, &query, config.default_page_size, Some("name")),
        })
    })
    .await
}

/// Refresh the jobs of a scan report. Never served from the view cache.
///
/// GET /scanreports/{id}/jobs
#[utoipa::path(
    get,
    path = "/api/v1/scanreports/{id}/jobs",
    tag = "Scan Reports",
    params(
        ("id" = i64, Path, description = "Scan report id")
    ),
    responses(
        (status = 200, description = "Jobs grouped by table", body = Vec<TableJobs>)
    )
)]
#[get("/scanreports/{id}/jobs")]
pub async fn get_scan_report_jobs(
    auth: BackendSession,
    client: web::Data<ApiClient>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let session = api_session(&client, auth);
    let jobs = session.get_jobs(path.into_inner()).await;

    let tables: Vec<TableJobs> = jobs_by_table(jobs)
        .into_iter()
        .map(|(scan_report_table_id, jobs)| TableJobs {
            scan_report_table_id,
            jobs: JobSummary::new(jobs),
        })
        .collect();

    Ok(HttpResponse::Ok().json(tables))
}

/// Refresh the jobs of one table. Never served from the view cache.
///
/// GET /scanreports/{id}/tables/{table_id}/jobs
#[utoipa::path(
    get,
    path = "/api/v1/scanreports/{id}/tables/{table_id}/jobs",
    tag = "Scan Reports",
    params(
        ("id" = i64, Path, description = "Scan report id"),
        ("table_id" = i64, Path, description = "Table id")
    ),
    responses(
        (status = 200, description = "Jobs of the table", body = TableJobs)
    )
)]
#[get("/scanreports/{id}/tables/{table_id}/jobs")]
pub async fn get_table_jobs(
    auth: BackendSession,
    client: web::Data<ApiClient>,
    path: web::Path<(i64, i64)>,
) -> AppResult<HttpResponse> {
    let (id, table_id) = path.into_inner();
    let session = api_session(&client, auth);
    let jobs = session.get_table_jobs(id, table_id).await;

    Ok(HttpResponse::Ok().json(TableJobs {
        scan_report_table_id: table_id,
        jobs: JobSummary::new(jobs),
    }))
}

/// Move a scan report to or from the archive.
///
/// PATCH /scanreports/{id}/archive
#[utoipa::path(
    patch,
    path = "/api/v1/scanreports/{id}/archive",
    tag = "Scan Reports",
    params(
        ("id" = i64, Path, description = "Scan report id")
    ),
    request_body = ArchiveRequest,
    responses(
        (status = 204, description = "Archive state updated"),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse)
    )
)]
#[patch("/scanreports/{id}/archive")]
pub async fn archive_scan_report(
    auth: BackendSession,
    client: web::Data<ApiClient>,
    cache: web::Data<ViewCache>,
    path: web::Path<i64>,
    body: web::Json<ArchiveRequest>,
) -> AppResult<HttpResponse> {
    let session = api_session(&client, auth);
    session
        .archive_scan_report(&cache, path.into_inner(), body.hidden)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a scan report.
///
/// DELETE /scanreports/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/scanreports/{id}",
    tag = "Scan Reports",
    params(
        ("id" = i64, Path, description = "Scan report id")
    ),
    responses(
        (status = 204, description = "Scan report deleted"),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse),
        (status = 404, description = "Scan report not found", body = crate::error::ErrorResponse)
    )
)]
#[delete("/scanreports/{id}")]
pub async fn delete_scan_report(
    auth: BackendSession,
    client: web::Data<ApiClient>,
    cache: web::Data<ViewCache>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let session = api_session(&client, auth);
    session.delete_scan_report(&cache, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Fields of a table with their concepts.
///
/// GET /scanreports/{id}/tables/{table_id}
#[utoipa::path(
    get,
    path = "/api/v1/scanreports/{id}/tables/{table_id}",
    tag = "Scan Reports",
    params(
        ("id" = i64, Path, description = "Scan report id"),
        ("table_id" = i64, Path, description = "Table id"),
        ("p" = Option<u32>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<u32>, Query, description = "Rows per page (default: 20)"),
        ("name__icontains" = Option<String>, Query, description = "Field name filter")
    ),
    responses(
        (status = 200, description = "Fields with concepts and permissions", body = serde_json::Value),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse),
        (status = 404, description = "Table not found", body = crate::error::ErrorResponse)
    )
)]
#[get("/scanreports/{id}/tables/{table_id}")]
pub async fn get_table_fields(
    req: HttpRequest,
    auth: BackendSession,
    client: web::Data<ApiClient>,
    cache: web::Data<ViewCache>,
    config: web::Data<Config>,
    path: web::Path<(i64, i64)>,
) -> AppResult<HttpResponse> {
    let (id, table_id) = path.into_inner();
    let session = api_session(&client, auth);
    let query = view_query(&req, &config);

    cached_view(&req, &cache, &session, async {
        let table = session.get_scan_report_table(id, table_id).await?;
        let filter = query.backend_filter();
        let (permissions, fields) = tokio::join!(
            session.get_scan_report_permissions(id),
            session.get_scan_report_fields(id, table_id, &filter),
        );
        let fields = annotate_page(&session, fields, &permissions).await;

        AppResult::Ok(FieldsView {
            can_edit: permissions.can_edit(),
            ready_for_concepts: table.is_ready_for_concepts(),
            table,
            permissions,
            fields: TableView::new(fields, &query, config.default_page_size, Some("name")),
        })
    })
    .await
}

/// Update person id, date event or death table flag.
///
/// PATCH /scanreports/{id}/tables/{table_id}
#[utoipa::path(
    patch,
    path = "/api/v1/scanreports/{id}/tables/{table_id}",
    tag = "Scan Reports",
    params(
        ("id" = i64, Path, description = "Scan report id"),
        ("table_id" = i64, Path, description = "Table id")
    ),
    request_body = ScanReportTableUpdate,
    responses(
        (status = 200, description = "Updated table", body = ScanReportTable),
        (status = 400, description = "Rejected by the backend", body = crate::error::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse)
    )
)]
#[patch("/scanreports/{id}/tables/{table_id}")]
pub async fn update_table(
    auth: BackendSession,
    client: web::Data<ApiClient>,
    cache: web::Data<ViewCache>,
    path: web::Path<(i64, i64)>,
    body: web::Json<ScanReportTableUpdate>,
) -> AppResult<HttpResponse> {
    let (id, table_id) = path.into_inner();
    let session = api_session(&client, auth);
    let table = session
        .update_scan_report_table(&cache, id, table_id, &body)
        .await?;
    Ok(HttpResponse::Ok().json(table))
}

/// Values of a field with their concepts.
///
/// GET /scanreports/{id}/tables/{table_id}/fields/{field_id}
#[utoipa::path(
    get,
    path = "/api/v1/scanreports/{id}/tables/{table_id}/fields/{field_id}",
    tag = "Scan Reports",
    params(
        ("id" = i64, Path, description = "Scan report id"),
        ("table_id" = i64, Path, description = "Table id"),
        ("field_id" = i64, Path, description = "Field id"),
        ("p" = Option<u32>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<u32>, Query, description = "Rows per page (default: 20)"),
        ("value__icontains" = Option<String>, Query, description = "Value filter")
    ),
    responses(
        (status = 200, description = "Values with concepts and permissions", body = serde_json::Value),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse),
        (status = 404, description = "Field not found", body = crate::error::ErrorResponse)
    )
)]
#[get("/scanreports/{id}/tables/{table_id}/fields/{field_id}")]
pub async fn get_field_values(
    req: HttpRequest,
    auth: BackendSession,
    client: web::Data<ApiClient>,
    cache: web::Data<ViewCache>,
    config: web::Data<Config>,
    path: web::Path<(i64, i64, i64)>,
) -> AppResult<HttpResponse> {
    let (id, table_id, field_id) = path.into_inner();
    let session = api_session(&client, auth);
    let query = view_query(&req, &config);

    cached_view(&req, &cache, &session, async {
        let (table, field) = tokio::join!(
            session.get_scan_report_table(id, table_id),
            session.get_scan_report_field(id, table_id, field_id),
        );
        let (table, field) = (table?, field?);

        let filter = query.backend_filter();
        let (permissions, values) = tokio::join!(
            session.get_scan_report_permissions(id),
            session.get_scan_report_values(id, table_id, field_id, &filter),
        );
        let values = annotate_page(&session, values, &permissions).await;

        AppResult::Ok(ValuesView {
            can_edit: permissions.can_edit(),
            ready_for_concepts: table.is_ready_for_concepts(),
            table,
            field,
            permissions,
            values: TableView::new(values, &query, config.default_page_size, Some("value")),
        })
    })
    .await
}

/// Update a field's flags or description.
///
/// PATCH /scanreports/{id}/tables/{table_id}/fields/{field_id}
#[utoipa::path(
    patch,
    path = "/api/v1/scanreports/{id}/tables/{table_id}/fields/{field_id}",
    tag = "Scan Reports",
    params(
        ("id" = i64, Path, description = "Scan report id"),
        ("table_id" = i64, Path, description = "Table id"),
        ("field_id" = i64, Path, description = "Field id")
    ),
    request_body = ScanReportFieldUpdate,
    responses(
        (status = 200, description = "Updated field", body = ScanReportField),
        (status = 400, description = "Rejected by the backend", body = crate::error::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse)
    )
)]
#[patch("/scanreports/{id}/tables/{table_id}/fields/{field_id}")]
pub async fn update_field(
    auth: BackendSession,
    client: web::Data<ApiClient>,
    cache: web::Data<ViewCache>,
    path: web::Path<(i64, i64, i64)>,
    body: web::Json<ScanReportFieldUpdate>,
) -> AppResult<HttpResponse> {
    let (id, table_id, field_id) = path.into_inner();
    let session = api_session(&client, auth);
    let field = session
        .update_scan_report_field(&cache, id, table_id, field_id, &body)
        .await?;
    Ok(HttpResponse::Ok().json(field))
}
