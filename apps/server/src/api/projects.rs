//! Project list view.

use actix_web::{HttpRequest, HttpResponse, get, web};

use super::{TableView, api_session, cached_view, view_query};
use crate::auth::BackendSession;
use crate::client::ApiClient;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::Project;
use crate::services::ViewCache;

/// Configure project routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_projects);
}

/// List projects.
///
/// GET /projects?p=1&name__icontains=..
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    tag = "Projects",
    params(
        ("p" = Option<u32>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<u32>, Query, description = "Rows per page (default: 20)"),
        ("name__icontains" = Option<String>, Query, description = "Project name filter")
    ),
    responses(
        (status = 200, description = "Page of projects", body = TableView<Project>)
    )
)]
#[get("/projects")]
pub async fn list_projects(
    req: HttpRequest,
    auth: BackendSession,
    client: web::Data<ApiClient>,
    cache: web::Data<ViewCache>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let session = api_session(&client, auth);
    let query = view_query(&req, &config);

    cached_view(&req, &cache, &session, async {
        let projects = session.get_projects_list(&query.backend_filter()).await;
        AppResult::Ok(TableView::new(
            projects,
            &query,
            config.default_page_size,
            Some("name"),
        ))
    })
    .await
}
