//! Mapping rule views and exports.

use actix_web::{HttpRequest, HttpResponse, get, web};
use chrono::Utc;
use serde::Deserialize;

use super::{TableView, api_session, cached_view, view_query};
use crate::auth::BackendSession;
use crate::client::{ApiClient, ApiError};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{AnalyseRules, MappingRule, RulesFormat};
use crate::services::ViewCache;
use crate::services::download::{extract_svg, rules_filename, text_attachment};

/// Export format of the download route.
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: RulesFormat,
}

/// Configure mapping rule routes.
/// Note: More specific routes must be registered before generic ones.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_summary_rules)
        .service(get_analyse_rules)
        .service(download_rules)
        .service(list_mapping_rules);
}

/// Turn an export body into the text served to the browser.
///
/// Diagram exports may wrap the `<svg>` element in extra markup; only the
/// element is kept.
fn export_text(bytes: &[u8], format: RulesFormat) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    match format {
        RulesFormat::Svg => extract_svg(&text).map(str::to_string),
        RulesFormat::Json | RulesFormat::Csv => Some(text.into_owned()),
    }
}

/// Mapping rules of a scan report.
///
/// GET /scanreports/{id}/mapping_rules
#[utoipa::path(
    get,
    path = "/api/v1/scanreports/{id}/mapping_rules",
    tag = "Mapping Rules",
    params(
        ("id" = i64, Path, description = "Scan report id"),
        ("p" = Option<u32>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<u32>, Query, description = "Rows per page (default: 20)")
    ),
    responses(
        (status = 200, description = "Page of mapping rules", body = TableView<MappingRule>)
    )
)]
#[get("/scanreports/{id}/mapping_rules")]
pub async fn list_mapping_rules(
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
        let rules = session
            .get_mapping_rules_list(id, &query.backend_filter())
            .await;
        AppResult::Ok(TableView::new(rules, &query, config.default_page_size, None))
    })
    .await
}

/// Rules restricted to the summary view.
///
/// GET /scanreports/{id}/mapping_rules/summary
#[utoipa::path(
    get,
    path = "/api/v1/scanreports/{id}/mapping_rules/summary",
    tag = "Mapping Rules",
    params(
        ("id" = i64, Path, description = "Scan report id"),
        ("p" = Option<u32>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<u32>, Query, description = "Rows per page (default: 20)")
    ),
    responses(
        (status = 200, description = "Page of summary rules", body = TableView<MappingRule>)
    )
)]
#[get("/scanreports/{id}/mapping_rules/summary")]
pub async fn get_summary_rules(
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
        let rules = session.get_summary_rules(id, &query.backend_filter()).await;
        AppResult::Ok(TableView::new(rules, &query, config.default_page_size, None))
    })
    .await
}

/// Ancestor/descendant analysis of the mapped concepts.
///
/// GET /scanreports/{id}/mapping_rules/analyse
#[utoipa::path(
    get,
    path = "/api/v1/scanreports/{id}/mapping_rules/analyse",
    tag = "Mapping Rules",
    params(
        ("id" = i64, Path, description = "Scan report id")
    ),
    responses(
        (status = 200, description = "Rule analysis", body = AnalyseRules)
    )
)]
#[get("/scanreports/{id}/mapping_rules/analyse")]
pub async fn get_analyse_rules(
    req: HttpRequest,
    auth: BackendSession,
    client: web::Data<ApiClient>,
    cache: web::Data<ViewCache>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let session = api_session(&client, auth);

    cached_view(&req, &cache, &session, async {
        AppResult::Ok(session.get_analyse_rules(id).await)
    })
    .await
}

/// Download the rules as an SVG diagram, JSON or CSV file.
///
/// GET /scanreports/{id}/mapping_rules/download?format=csv
#[utoipa::path(
    get,
    path = "/api/v1/scanreports/{id}/mapping_rules/download",
    tag = "Mapping Rules",
    params(
        ("id" = i64, Path, description = "Scan report id"),
        ("format" = RulesFormat, Query, description = "svg, json or csv")
    ),
    responses(
        (status = 200, description = "Rules export", content_type = "application/octet-stream"),
        (status = 400, description = "Unsupported format", body = crate::error::ErrorResponse),
        (status = 502, description = "Export failed", body = crate::error::ErrorResponse)
    )
)]
#[get("/scanreports/{id}/mapping_rules/download")]
pub async fn download_rules(
    auth: BackendSession,
    client: web::Data<ApiClient>,
    path: web::Path<i64>,
    query: web::Query<ExportQuery>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let format = query.format;
    let session = api_session(&client, auth);

    let (scan_report, export) = tokio::join!(
        session.get_scan_report(id),
        session.get_map_diagram(id, format),
    );
    let scan_report = scan_report?;

    let text = export
        .and_then(|blob| export_text(&blob.bytes, format))
        .ok_or_else(|| {
            AppError::Upstream(ApiError::UnexpectedBody(format!(
                "no {} export for scan report {id}",
                format.extension()
            )))
        })?;

    let filename = rules_filename(&scan_report.dataset, format, Utc::now());
    Ok(text_attachment(text, format, &filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_export_is_trimmed_to_element() {
        let body = br#"<?xml version="1.0"?><html><svg width="10"><g/></svg></html>"#;
        assert_eq!(
            export_text(body, RulesFormat::Svg).as_deref(),
            Some(r#"<svg width="10"><g/></svg>"#)
        );
        assert_eq!(export_text(b"<html></html>", RulesFormat::Svg), None);
    }

    #[test]
    fn test_csv_export_is_kept() {
        let body = b"source_table,source_field\nconditions.csv,diagnosis\n";
        assert_eq!(
            export_text(body, RulesFormat::Csv).as_deref(),
            Some("source_table,source_field\nconditions.csv,diagnosis\n")
        );
    }
}
