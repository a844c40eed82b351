//! Query-state navigation for table filters, sorting and paging.

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::query::{RedirectNavigator, SearchParams, navigate_with_search_param};

#[derive(Debug, Deserialize)]
pub struct NavigateQuery {
    /// Query parameter to change, e.g. `name__icontains` or `p`.
    pub param: String,
    /// New value; empty or missing removes the parameter.
    #[serde(default)]
    pub value: String,
    /// Page to return to, with its current query string.
    pub return_to: String,
}

/// Configure navigation routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(navigate);
}

/// Only same-origin absolute paths are followed.
fn validate_return_to(return_to: &str) -> AppResult<()> {
    if !return_to.starts_with('/') || return_to.starts_with("//") || return_to.contains('\\') {
        return Err(AppError::InvalidInput(
            "return_to must be a path on this site".to_string(),
        ));
    }
    Ok(())
}

/// Location after merging `param=value` into `return_to`'s query.
fn merged_location(query: &NavigateQuery) -> AppResult<String> {
    validate_return_to(&query.return_to)?;

    let (base, current) = query
        .return_to
        .split_once('?')
        .unwrap_or((query.return_to.as_str(), ""));

    let mut navigator = RedirectNavigator::new(base);
    navigate_with_search_param(
        &query.param,
        &query.value,
        &mut navigator,
        &SearchParams::parse(current),
    );

    Ok(navigator
        .location()
        .unwrap_or(base)
        .trim_end_matches('?')
        .to_string())
}

/// Merge one parameter into a page's query and redirect there.
///
/// GET /navigate?param=name__icontains&value=blood&return_to=%2Fscanreports%2F%3Fp%3D2
#[utoipa::path(
    get,
    path = "/api/v1/navigate",
    tag = "Navigation",
    params(
        ("param" = String, Query, description = "Query parameter to set"),
        ("value" = Option<String>, Query, description = "New value; empty removes the parameter"),
        ("return_to" = String, Query, description = "Path and query of the current page")
    ),
    responses(
        (status = 303, description = "Redirect to the updated page"),
        (status = 400, description = "Invalid return path", body = crate::error::ErrorResponse)
    )
)]
#[get("/navigate")]
pub async fn navigate(query: web::Query<NavigateQuery>) -> AppResult<HttpResponse> {
    let location = merged_location(&query)?;
    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish())
}
