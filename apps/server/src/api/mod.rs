//! Composed view endpoints served under `/api/v1`.

pub mod concepts;
pub mod datasets;
pub mod files;
pub mod health;
pub mod mapping_rules;
pub mod navigation;
pub mod omop;
pub mod openapi;
pub mod projects;
pub mod scan_reports;
pub mod users;

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use std::future::Future;
use tracing::debug;
use utoipa::ToSchema;

use crate::auth::BackendSession;
use crate::client::{ApiClient, ApiSession};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::PaginatedResponse;
use crate::query::{SortDirection, ViewQuery};
use crate::services::ViewCache;

pub use health::configure_health_routes;
pub use openapi::ApiDoc;

/// A page of rows as the table renderer consumes it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TableView<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    /// Current page (`p`), starting at 1.
    pub page: u32,
    pub page_size: u32,
    /// Column the search box filters with `<column>__icontains`.
    #[schema(value_type = Option<String>)]
    pub filter_column: Option<&'static str>,
    /// Current search box contents.
    pub filter_value: Option<String>,
    /// Sorted column from `ordering`.
    pub sort_column: Option<String>,
    pub sort_direction: Option<SortDirection>,
    /// Archived (`true`) or active (`false`) tab, when the view has tabs.
    pub hidden: Option<bool>,
    /// Selected mapping status facets.
    pub mapping_statuses: Vec<String>,
    pub results: Vec<T>,
}

impl<T> TableView<T> {
    pub fn new(
        page: PaginatedResponse<T>,
        query: &ViewQuery,
        default_page_size: u32,
        filter_column: Option<&'static str>,
    ) -> Self {
        Self {
            count: page.count,
            next: page.next,
            previous: page.previous,
            page: query.page(),
            page_size: query.page_size().unwrap_or(default_page_size),
            filter_column,
            filter_value: filter_column
                .and_then(|column| query.icontains(column))
                .map(str::to_string),
            sort_column: query.ordering().map(|(column, _)| column.to_string()),
            sort_direction: query.ordering().map(|(_, direction)| direction),
            hidden: query.hidden(),
            mapping_statuses: query
                .mapping_statuses()
                .into_iter()
                .map(str::to_string)
                .collect(),
            results: page.results,
        }
    }
}

/// Backend session for the caller of this request.
pub(crate) fn api_session(client: &ApiClient, auth: BackendSession) -> ApiSession {
    client.session(auth.credentials)
}

/// Parse the request's query with the configured default page size.
pub(crate) fn view_query(req: &HttpRequest, config: &Config) -> ViewQuery {
    ViewQuery::new(req.query_string(), config.default_page_size)
}

/// Cache key of a view: path plus query.
fn view_key(req: &HttpRequest) -> String {
    match req.query_string() {
        "" => req.path().to_string(),
        query => format!("{}?{}", req.path(), query),
    }
}

/// Serve a composed GET view from the view cache.
///
/// `build` is only polled on a miss; a hit drops it unstarted. The result
/// is not stored when a soft accessor fell back to a default during the
/// build, or when a mutation revalidated the cache while it ran.
pub(crate) async fn cached_view<T>(
    req: &HttpRequest,
    cache: &ViewCache,
    session: &ApiSession,
    build: impl Future<Output = AppResult<T>>,
) -> AppResult<HttpResponse>
where
    T: Serialize,
{
    let fingerprint = session.credentials().fingerprint();
    let key = view_key(req);

    if let Some(body) = cache.get(&fingerprint, &key).await {
        debug!(path = %key, "View cache hit");
        return Ok(HttpResponse::Ok().json(body));
    }

    let built_at = cache.generation();
    let body = serde_json::to_value(build.await?)?;
    if session.is_degraded() {
        debug!(path = %key, "Degraded view, not cached");
    } else {
        cache.insert(&fingerprint, &key, body.clone(), built_at).await;
    }
    Ok(HttpResponse::Ok().json(body))
}

/// Configure every view route.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_health_routes)
        .configure(scan_reports::configure_routes)
        .configure(concepts::configure_routes)
        .configure(mapping_rules::configure_routes)
        .configure(files::configure_routes)
        .configure(datasets::configure_routes)
        .configure(projects::configure_routes)
        .configure(omop::configure_routes)
        .configure(users::configure_routes)
        .configure(navigation::configure_routes);
}
