//! Session handling: missing credentials, rejected sessions, bearer tokens.

use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::test;

use carrot_web_lib::config::SESSION_COOKIE;

use super::test_helpers::{TEST_LOGIN_PATH, create_test_app, get, json_body, start_backend};

#[actix_rt::test]
async fn test_missing_credentials_point_to_login() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let req = test::TestRequest::get().uri("/api/v1/scanreports").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        TEST_LOGIN_PATH
    );
    assert!(backend.requests_to("GET", "/api/").is_empty());
}

#[actix_rt::test]
async fn test_current_user() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let resp = test::call_service(&app, get("/api/v1/me").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["username"], "alice");
}

#[actix_rt::test]
async fn test_rejected_session_redirects_to_login() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/me")
        .cookie(Cookie::new(SESSION_COOKIE, "expired"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        TEST_LOGIN_PATH
    );
}

#[actix_rt::test]
async fn test_bearer_token_is_forwarded() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/scanreports")
        .insert_header((header::AUTHORIZATION, "Bearer service-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let calls = backend.requests_to("GET", "/api/v2/scanreports/");
    assert_eq!(
        calls[0].authorization.as_deref(),
        Some("Bearer service-token")
    );
    assert!(calls[0].cookie.is_none());
}

#[actix_rt::test]
async fn test_views_are_cached_per_session() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    test::call_service(&app, get("/api/v1/scanreports").to_request()).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/scanreports")
        .insert_header((header::AUTHORIZATION, "Bearer service-token"))
        .to_request();
    test::call_service(&app, req).await;

    assert_eq!(backend.requests_to("GET", "/api/v2/scanreports/").len(), 2);
}

#[actix_rt::test]
async fn test_health_needs_no_session() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/v1/ready").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
