//! Query-state navigation redirects.

use actix_web::http::{StatusCode, header};
use actix_web::test;

use super::test_helpers::{create_test_app, start_backend};

async fn location_for(uri: &str) -> (StatusCode, Option<String>) {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    let location = resp
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    (resp.status(), location)
}

#[actix_rt::test]
async fn test_navigate_sets_parameter() {
    let (status, location) = location_for(
        "/api/v1/navigate?param=dataset__icontains&value=cohort&return_to=%2Fscanreports%2F%3Fp%3D2",
    )
    .await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(
        location.as_deref(),
        Some("/scanreports/?p=2&dataset__icontains=cohort")
    );
}

#[actix_rt::test]
async fn test_navigate_removes_empty_parameter() {
    let (status, location) = location_for(
        "/api/v1/navigate?param=p&value=&return_to=%2Fscanreports%2F%3Fp%3D2%26hidden%3Dtrue",
    )
    .await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/scanreports/?hidden=true"));
}

#[actix_rt::test]
async fn test_navigate_rejects_offsite_return() {
    let (status, location) =
        location_for("/api/v1/navigate?param=p&value=2&return_to=https%3A%2F%2Fevil.example").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(location.is_none());
}
