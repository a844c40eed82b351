//! Composed table views: paging, concepts per row, soft defaults and caching.

use actix_web::http::StatusCode;
use actix_web::test;

use super::mock_backend::{BROKEN_REPORT, FORBIDDEN_REPORT};
use super::test_helpers::{create_test_app, get, json_body, start_backend};

#[actix_rt::test]
async fn test_scan_report_list_shows_active_tab() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let resp = test::call_service(&app, get("/api/v1/scanreports").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 20);
    assert_eq!(body["filter_column"], "dataset");
    assert_eq!(body["results"][0]["dataset"], "Cohort A");

    let calls = backend.requests_to("GET", "/api/v2/scanreports/");
    assert_eq!(calls.len(), 1);
    assert!(calls[0].query.contains("hidden=false"));
    assert!(calls[0].query.contains("page_size=20"));
}

#[actix_rt::test]
async fn test_scan_report_list_echoes_search_filter() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let resp = test::call_service(
        &app,
        get("/api/v1/scanreports?dataset__icontains=coh").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["filter_value"], "coh");

    let calls = backend.requests_to("GET", "/api/v2/scanreports/");
    assert!(calls[0].query.contains("dataset__icontains=coh"));
}

#[actix_rt::test]
async fn test_scan_report_list_reports_sort_tab_and_facets() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let resp = test::call_service(
        &app,
        get("/api/v1/scanreports?ordering=-dataset&hidden=true&mapping_status__value__in=COMPLET%2CINPRO25")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["sort_column"], "dataset");
    assert_eq!(body["sort_direction"], "descending");
    assert_eq!(body["hidden"], true);
    assert_eq!(body["mapping_statuses"], serde_json::json!(["COMPLET", "INPRO25"]));

    let calls = backend.requests_to("GET", "/api/v2/scanreports/");
    assert!(calls[0].query.contains("hidden=true"));
    assert!(!calls[0].query.contains("hidden=false"));
}

#[actix_rt::test]
async fn test_session_cookie_is_forwarded() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    test::call_service(&app, get("/api/v1/scanreports?hidden=true").to_request()).await;

    let calls = backend.requests_to("GET", "/api/v2/scanreports/");
    let cookie = calls[0].cookie.as_deref().unwrap_or_default();
    assert!(cookie.contains("sessionid=valid-session"));
    assert!(calls[0].query.contains("hidden=true"));
    assert!(!calls[0].query.contains("hidden=false"));
}

#[actix_rt::test]
async fn test_scan_report_detail_groups_jobs_by_table() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let resp = test::call_service(&app, get("/api/v1/scanreports/1").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["scan_report"]["id"], 1);
    assert_eq!(body["permissions"]["permissions"][1], "CanEdit");

    let table = &body["tables"]["results"][0];
    assert_eq!(table["name"], "Demographics.csv");
    assert_eq!(table["jobs"].as_array().map(Vec::len), Some(3));
    // A running job wins.
    assert_eq!(table["general_status"], "IN_PROGRESS");
}

#[actix_rt::test]
async fn test_fields_view_attaches_concepts_per_row() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let resp = test::call_service(&app, get("/api/v1/scanreports/1/tables/7").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["ready_for_concepts"], true);
    assert_eq!(body["can_edit"], true);
    assert_eq!(body["fields"]["filter_column"], "name");
    assert!(body["fields"]["filter_value"].is_null());

    let rows = body["fields"]["results"].as_array().expect("rows");
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0]["name"], "Sex");
    assert_eq!(rows[0]["concepts"][0]["concept_id"], 8507);
    assert_eq!(rows[0]["concepts"][0]["concept_name"], "Male");
    assert_eq!(rows[0]["concepts"][0]["scan_report_concept_id"], 10);
    assert_eq!(rows[0]["permissions"][0], "CanView");

    // A row without joins still carries an empty list.
    assert_eq!(rows[1]["name"], "Weight");
    assert_eq!(rows[1]["concepts"], serde_json::json!([]));

    let joins = backend.requests_to("GET", "/api/v2/scanreports/concepts/");
    assert_eq!(joins.len(), 1);
    assert!(joins[0].query.contains("object_id__in=70,71"));
}

#[actix_rt::test]
async fn test_values_view_without_joins_skips_concept_lookup() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let resp = test::call_service(
        &app,
        get("/api/v1/scanreports/1/tables/7/fields/70").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["field"]["name"], "Sex");
    assert_eq!(body["values"]["filter_column"], "value");
    assert_eq!(body["values"]["results"][0]["value"], "M");
    assert_eq!(body["values"]["results"][0]["concepts"], serde_json::json!([]));

    assert!(backend.requests_to("GET", "/api/v2/omop/conceptsfilter/").is_empty());
}

#[actix_rt::test]
async fn test_failing_lists_render_empty() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let uri = format!("/api/v1/scanreports/{BROKEN_REPORT}");
    let resp = test::call_service(&app, get(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["tables"]["count"], 0);
    assert_eq!(body["tables"]["results"], serde_json::json!([]));
    assert_eq!(body["permissions"]["permissions"], serde_json::json!([]));
}

#[actix_rt::test]
async fn test_forbidden_report_maps_to_403() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let uri = format!("/api/v1/scanreports/{FORBIDDEN_REPORT}");
    let resp = test::call_service(&app, get(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let body = json_body(resp).await;
    assert_eq!(body["error"], "FORBIDDEN");
}

#[actix_rt::test]
async fn test_missing_table_maps_to_404() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let resp = test::call_service(&app, get("/api/v1/scanreports/1/tables/8").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_repeated_view_is_served_from_cache() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    for _ in 0..2 {
        let resp =
            test::call_service(&app, get("/api/v1/scanreports/1/tables/7").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
    assert_eq!(
        backend
            .requests_to("GET", "/api/v2/scanreports/1/tables/7/fields/")
            .len(),
        1
    );

    // A different query is a different view.
    test::call_service(&app, get("/api/v1/scanreports/1/tables/7?p=2").to_request()).await;
    assert_eq!(
        backend
            .requests_to("GET", "/api/v2/scanreports/1/tables/7/fields/")
            .len(),
        2
    );
}

#[actix_rt::test]
async fn test_table_jobs_refresh_reads_paginated_jobs() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let resp = test::call_service(
        &app,
        get("/api/v1/scanreports/1/tables/7/jobs").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["scan_report_table_id"], 7);
    assert_eq!(body["general_status"], "COMPLETE");
    assert_eq!(body["runs"].as_array().map(Vec::len), Some(1));
}

#[actix_rt::test]
async fn test_fallback_page_is_not_cached() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;
    backend.fail_once("GET", "/api/v2/scanreports/");

    let first = json_body(test::call_service(&app, get("/api/v1/scanreports").to_request()).await).await;
    assert_eq!(first["count"], 0);
    assert_eq!(first["results"], serde_json::json!([]));

    // The backend recovered; the empty fallback must not be served again.
    let second = json_body(test::call_service(&app, get("/api/v1/scanreports").to_request()).await).await;
    assert_eq!(second["count"], 1);
    assert_eq!(second["results"][0]["dataset"], "Cohort A");
    assert_eq!(backend.requests_to("GET", "/api/v2/scanreports/").len(), 2);

    // A healthy render is cached as usual.
    test::call_service(&app, get("/api/v1/scanreports").to_request()).await;
    assert_eq!(backend.requests_to("GET", "/api/v2/scanreports/").len(), 2);
}
