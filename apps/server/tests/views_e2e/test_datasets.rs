//! Dataset detail view.

use actix_web::http::StatusCode;
use actix_web::test;

use super::test_helpers::{create_test_app, get, json_body, start_backend};

#[actix_rt::test]
async fn test_dataset_detail_lists_its_projects() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let resp = test::call_service(&app, get("/api/v1/datasets/4").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["dataset"]["name"], "Health Study");
    assert_eq!(body["data_partner"], "University Hospital");
    assert_eq!(body["permissions"]["permissions"][0], "CanView");
    assert_eq!(body["projects"][0]["name"], "Cohort Project");

    // Projects are looked up by dataset id.
    let lookups = backend.requests_to("GET", "/api/projects/");
    assert_eq!(lookups.len(), 1);
    assert_eq!(lookups[0].query, "dataset=4");
}

#[actix_rt::test]
async fn test_unknown_dataset_is_404() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let resp = test::call_service(&app, get("/api/v1/datasets/5").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
