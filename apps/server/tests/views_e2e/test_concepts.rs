//! Adding and removing concepts, and the views they revalidate.

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::json;

use super::mock_backend::UNKNOWN_CONCEPT;
use super::test_helpers::{create_test_app, get, json_body, session_cookie, start_backend};

const FIELDS_VIEW: &str = "/api/v1/scanreports/1/tables/7";
const ADD_CONCEPT: &str = "/api/v1/scanreports/1/tables/7/concepts";

fn add_request(object_id: i64, concept: i64) -> test::TestRequest {
    test::TestRequest::post()
        .uri(ADD_CONCEPT)
        .cookie(session_cookie())
        .set_json(json!({
            "object_id": object_id,
            "concept": concept,
            "location": "scanreportfield"
        }))
}

#[actix_rt::test]
async fn test_add_concept_returns_join_and_concept() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let resp = test::call_service(&app, add_request(71, 4212).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = json_body(resp).await;
    assert_eq!(body["join"]["id"], 11);
    assert_eq!(body["join"]["object_id"], 71);
    assert_eq!(body["join"]["creation_type"], "M");
    assert_eq!(body["concept"]["concept_id"], 4212);
    assert_eq!(body["concept"]["concept_name"], "Blood pressure");
    assert_eq!(body["concept"]["scan_report_concept_id"], 11);

    let posts = backend.requests_to("POST", "/api/v2/scanreports/concepts/");
    assert_eq!(posts.len(), 1);
    let sent = posts[0].body.clone().expect("JSON body");
    assert_eq!(sent["content_type"], "scanreportfield");
    assert_eq!(sent["creation_type"], "M");
    assert_eq!(sent["table_id"], 7);

    // The new join is looked up by object and concept.
    let lookups = backend.requests_to("GET", "/api/v2/scanreports/concepts/");
    assert!(lookups[0].query.contains("object_id=71"));
    assert!(lookups[0].query.contains("concept__concept_id=4212"));
}

#[actix_rt::test]
async fn test_add_concept_survives_failed_lookup() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;
    backend.fail_once("GET", "/api/v2/scanreports/concepts/");

    let resp = test::call_service(&app, add_request(71, 4212).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // The join echoed by the POST stands in for the failed lookup.
    let body = json_body(resp).await;
    assert_eq!(body["join"]["id"], 11);
    assert_eq!(body["concept"]["concept_id"], 4212);
    assert_eq!(body["concept"]["scan_report_concept_id"], 11);
    assert_eq!(backend.join_count(), 2);
    assert_eq!(backend.requests_to("POST", "/api/v2/scanreports/concepts/").len(), 1);
}

#[actix_rt::test]
async fn test_add_concept_revalidates_fields_view() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let before = json_body(test::call_service(&app, get(FIELDS_VIEW).to_request()).await).await;
    assert_eq!(before["fields"]["results"][1]["concepts"], json!([]));

    let resp = test::call_service(&app, add_request(71, 4212).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let after = json_body(test::call_service(&app, get(FIELDS_VIEW).to_request()).await).await;
    assert_eq!(after["fields"]["results"][1]["concepts"][0]["concept_id"], 4212);
    assert_eq!(
        backend
            .requests_to("GET", "/api/v2/scanreports/1/tables/7/fields/")
            .len(),
        2
    );
}

#[actix_rt::test]
async fn test_rejected_concept_keeps_backend_message() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let resp = test::call_service(&app, add_request(71, UNKNOWN_CONCEPT).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = json_body(resp).await;
    assert_eq!(body["error"], "INVALID_INPUT");
    assert_eq!(
        body["message"],
        "Adding concept failed. Concept id 999 does not exist in our database."
    );
    assert_eq!(backend.join_count(), 1);
}

#[actix_rt::test]
async fn test_delete_concept() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let before = json_body(test::call_service(&app, get(FIELDS_VIEW).to_request()).await).await;
    assert_eq!(before["fields"]["results"][0]["concepts"][0]["scan_report_concept_id"], 10);

    let req = test::TestRequest::delete()
        .uri("/api/v1/scanreports/1/tables/7/concepts/10")
        .cookie(session_cookie())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(backend.join_count(), 0);

    let after = json_body(test::call_service(&app, get(FIELDS_VIEW).to_request()).await).await;
    assert_eq!(after["fields"]["results"][0]["concepts"], json!([]));
}

#[actix_rt::test]
async fn test_delete_unknown_join_is_404() {
    let backend = start_backend().await;
    let app = create_test_app(&backend).await;

    let req = test::TestRequest::delete()
        .uri("/api/v1/scanreports/1/tables/7/concepts/404")
        .cookie(session_cookie())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
