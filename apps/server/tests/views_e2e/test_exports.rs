//! Mapping rule exports and generated file downloads.

use actix_web::http::{StatusCode, header};
use actix_web::test;

use super::test_helpers::{create_test_app, get, start_backend};

fn disposition(resp: &actix_web::dev::ServiceResponse) -> String {
    resp.headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[actix_rt::test]
async fn test_csv_rules_download() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let resp = test::call_service(
        &app,
        get("/api/v1/scanreports/1/mapping_rules/download?format=csv").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let disposition = disposition(&resp);
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("Cohort A Rules - "));
    assert!(disposition.contains(".csv"));

    let body = test::read_body(resp).await;
    assert!(body.starts_with(b"source_table,source_field"));

    let posts = backend.requests_to("POST", "/api/scanreports/1/mapping_rules/");
    assert_eq!(
        posts[0].body.as_ref().map(|b| b["download_rules_as_csv"].clone()),
        Some(serde_json::json!(true))
    );
}

#[actix_rt::test]
async fn test_svg_rules_download_keeps_only_the_diagram() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let resp = test::call_service(
        &app,
        get("/api/v1/scanreports/1/mapping_rules/download?format=svg").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/svg+xml"
    );
    assert!(disposition(&resp).contains(".svg"));

    let body = test::read_body(resp).await;
    assert_eq!(&body[..], br#"<svg width="100"><g id="rules"/></svg>"#);
}

#[actix_rt::test]
async fn test_failed_export_is_bad_gateway() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let resp = test::call_service(
        &app,
        get("/api/v1/scanreports/1/mapping_rules/download?format=json").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[actix_rt::test]
async fn test_unknown_format_is_rejected() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let resp = test::call_service(
        &app,
        get("/api/v1/scanreports/1/mapping_rules/download?format=pdf").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_generated_file_keeps_backend_name() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let resp = test::call_service(&app, get("/api/v1/scanreports/1/downloads/5").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(disposition(&resp).contains("Rules - 1.json"));

    let body = test::read_body(resp).await;
    assert_eq!(&body[..], br#"{"rules": []}"#);
}
