//! Mock Carrot-Mapper backend for E2E tests.
//!
//! Starts an in-process HTTP server answering the Django routes the views
//! call, with canned records and a mutable list of concept joins.

use actix_web::http::header;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

/// Session id the mock accepts for `user/me/`.
pub const VALID_SESSION: &str = "valid-session";

/// Scan report the caller may not see.
pub const FORBIDDEN_REPORT: i64 = 2;

/// Scan report whose list endpoints all fail with 500.
pub const BROKEN_REPORT: i64 = 3;

/// Concept id the backend rejects on add.
pub const UNKNOWN_CONCEPT: i64 = 999;

/// A request as the mock saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub cookie: Option<String>,
    pub authorization: Option<String>,
    pub csrf: Option<String>,
    pub body: Option<Value>,
}

/// Shared state for the mock backend.
pub struct MockState {
    pub joins: Vec<Value>,
    pub next_join_id: i64,
    pub requests: Vec<RecordedRequest>,
    /// `(method, path prefix)` pairs; each fails the next matching request
    /// with 500 and is then consumed.
    pub fail_once: Vec<(String, String)>,
}

/// Mock backend serving the Django API under `/api/`.
pub struct MockBackend {
    pub url: String,
    pub state: Arc<Mutex<MockState>>,
}

fn query_map(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| {
            (
                k.to_string(),
                urlencoding::decode(v).map(|v| v.into_owned()).unwrap_or_default(),
            )
        })
        .collect()
}

fn ids(value: Option<&String>) -> Vec<i64> {
    value
        .map(|v| v.split(',').filter_map(|id| id.parse().ok()).collect())
        .unwrap_or_default()
}

fn page(results: Vec<Value>) -> Value {
    json!({
        "count": results.len(),
        "next": null,
        "previous": null,
        "results": results,
    })
}

fn concept(id: i64) -> Value {
    let name = match id {
        4212 => "Blood pressure",
        8507 => "Male",
        _ => "Body weight",
    };
    json!({
        "concept_id": id,
        "concept_name": name,
        "domain_id": "Observation",
        "vocabulary_id": "SNOMED",
        "concept_class_id": "Clinical Finding",
        "standard_concept": "S",
        "concept_code": id.to_string(),
        "valid_start_date": "1970-01-01",
        "valid_end_date": "2099-12-31",
        "invalid_reason": null
    })
}

const KNOWN_CONCEPTS: [i64; 3] = [4212, 8507, 3025315];

fn join(id: i64, object_id: i64, concept: i64, content_type: i64) -> Value {
    json!({
        "id": id,
        "object_id": object_id,
        "creation_type": "M",
        "concept": concept,
        "content_type": content_type
    })
}

fn scan_report(id: i64) -> Value {
    json!({
        "id": id,
        "name": "demographics.xlsx",
        "dataset": "Cohort A",
        "parent_dataset": "Health Study",
        "data_partner": "University Hospital",
        "upload_status": {"value": "COMPLETE"},
        "mapping_status": {"value": "INPRO50"},
        "author": "alice",
        "visibility": "PUBLIC",
        "created_at": "2024-05-01T09:00:00Z",
        "updated_at": "2024-05-01T09:30:00Z",
        "hidden": false
    })
}

fn table(id: i64) -> Value {
    json!({
        "id": id,
        "created_at": "2024-05-01T09:00:00Z",
        "updated_at": "2024-05-01T09:00:00Z",
        "name": "Demographics.csv",
        "scan_report": 1,
        "person_id": "PersonID",
        "date_event": "VisitDate",
        "death_table": false
    })
}

fn field(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "created_at": "2024-05-01T09:00:00Z",
        "updated_at": "2024-05-01T09:00:00Z",
        "name": name,
        "description_column": "",
        "type_column": "VARCHAR",
        "is_ignore": false,
        "pass_from_source": true,
        "scan_report_table": 7
    })
}

fn job(id: i64, minute: u32, status: &str) -> Value {
    json!({
        "id": id,
        "created_at": format!("2024-05-01T10:{minute:02}:00Z"),
        "scan_report_id": 1,
        "scan_report_table_id": 7,
        "stage": {"value": "BUILD_CONCEPTS_FROM_DICT"},
        "status": {"value": status},
        "details": ""
    })
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({"detail": "Not found."}))
}

fn handle(method: &str, path: &str, query: &str, req: &RecordedRequest, state: &mut MockState) -> HttpResponse {
    let params = query_map(query);
    let segments: Vec<&str> = path
        .trim_start_matches("/api/")
        .trim_end_matches('/')
        .split('/')
        .collect();

    match (method, segments.as_slice()) {
        ("GET", [""]) => HttpResponse::Ok().json(json!({})),

        ("GET", ["user", "me"]) => {
            let valid = req
                .cookie
                .as_deref()
                .is_some_and(|c| c.contains(&format!("sessionid={VALID_SESSION}")));
            if valid {
                HttpResponse::Ok().json(json!({
                    "id": 1, "username": "alice", "email": "alice@example.org", "is_active": true
                }))
            } else {
                HttpResponse::Forbidden()
                    .json(json!({"detail": "Authentication credentials were not provided."}))
            }
        }

        ("GET", ["v2", "scanreports"]) => HttpResponse::Ok().json(page(vec![scan_report(1)])),

        ("GET", ["v2", "scanreports", "concepts"]) => {
            let object_ids = ids(params.get("object_id__in"));
            let object_id: Option<i64> = params.get("object_id").and_then(|v| v.parse().ok());
            let concept_id: Option<i64> =
                params.get("concept__concept_id").and_then(|v| v.parse().ok());
            let results = state
                .joins
                .iter()
                .filter(|j| {
                    let object = j["object_id"].as_i64().unwrap_or_default();
                    let concept = j["concept"].as_i64().unwrap_or_default();
                    (object_ids.is_empty() || object_ids.contains(&object))
                        && object_id.is_none_or(|o| o == object)
                        && concept_id.is_none_or(|c| c == concept)
                })
                .cloned()
                .collect();
            HttpResponse::Ok().json(page(results))
        }

        ("POST", ["v2", "scanreports", "concepts"]) => {
            let body = req.body.clone().unwrap_or_default();
            let concept = body["concept"].as_i64().unwrap_or_default();
            if concept == UNKNOWN_CONCEPT || !KNOWN_CONCEPTS.contains(&concept) {
                return HttpResponse::BadRequest().json(json!({
                    "detail": format!("Concept id {concept} does not exist in our database.")
                }));
            }
            let content_type = if body["content_type"] == "scanreportvalue" { 24 } else { 23 };
            let id = state.next_join_id;
            state.next_join_id += 1;
            let created = join(id, body["object_id"].as_i64().unwrap_or_default(), concept, content_type);
            state.joins.push(created.clone());
            HttpResponse::Created().json(created)
        }

        ("DELETE", ["v2", "scanreports", "concepts", join_id]) => {
            let join_id: i64 = join_id.parse().unwrap_or_default();
            let before = state.joins.len();
            state.joins.retain(|j| j["id"].as_i64() != Some(join_id));
            if state.joins.len() == before {
                not_found()
            } else {
                HttpResponse::NoContent().finish()
            }
        }

        ("GET", ["v2", "omop", "conceptsfilter"]) => {
            let results = ids(params.get("concept_id__in"))
                .into_iter()
                .filter(|id| KNOWN_CONCEPTS.contains(id))
                .map(concept)
                .collect();
            HttpResponse::Ok().json(page(results))
        }

        ("GET", ["v2", "scanreports", id, ..]) if *id == FORBIDDEN_REPORT.to_string() => {
            HttpResponse::Forbidden()
                .json(json!({"detail": "You do not have permission to perform this action."}))
        }

        ("GET", ["v2", "scanreports", id, _, ..]) if *id == BROKEN_REPORT.to_string() => {
            HttpResponse::InternalServerError().body("<h1>Server Error (500)</h1>")
        }

        ("GET", ["v2", "scanreports", id]) => HttpResponse::Ok().json(scan_report(id.parse().unwrap_or(1))),
        ("DELETE", ["v2", "scanreports", _]) => HttpResponse::NoContent().finish(),
        ("PATCH", ["v2", "scanreports", id]) => {
            let mut report = scan_report(id.parse().unwrap_or(1));
            report["hidden"] = req.body.as_ref().map(|b| b["hidden"].clone()).unwrap_or_default();
            HttpResponse::Ok().json(report)
        }

        ("GET", ["v2", "scanreports", _, "permissions"]) => {
            HttpResponse::Ok().json(json!({"permissions": ["CanView", "CanEdit"]}))
        }

        ("GET", ["v2", "scanreports", _, "jobs"]) => HttpResponse::Ok().json(json!([
            job(1, 0, "COMPLETE"),
            job(2, 1, "COMPLETE"),
            job(3, 2, "IN_PROGRESS"),
        ])),

        ("GET", ["v2", "scanreports", _, "tables"]) => HttpResponse::Ok().json(page(vec![table(7)])),
        ("GET", ["v2", "scanreports", _, "tables", "7"]) => HttpResponse::Ok().json(table(7)),
        ("GET", ["v2", "scanreports", _, "tables", _]) => not_found(),

        ("GET", ["v2", "scanreports", _, "tables", "7", "jobs"]) => HttpResponse::Ok().json(page(vec![
            job(1, 0, "COMPLETE"),
            job(2, 1, "COMPLETE"),
            job(3, 2, "COMPLETE"),
        ])),

        ("GET", ["v2", "scanreports", _, "tables", _, "fields"]) => HttpResponse::Ok().json(page(vec![
            field(70, "Sex"),
            field(71, "Weight"),
        ])),
        ("GET", ["v2", "scanreports", _, "tables", _, "fields", "70"]) => {
            HttpResponse::Ok().json(field(70, "Sex"))
        }
        ("GET", ["v2", "scanreports", _, "tables", _, "fields", "70", "values"]) => {
            // Value ids overlap field ids on purpose; joins match on object_id only.
            HttpResponse::Ok().json(page(vec![json!({
                "id": 700,
                "value": "M",
                "frequency": 120,
                "value_description": "Male",
                "scan_report_field": 70
            })]))
        }

        ("POST", ["scanreports", _, "mapping_rules"]) => {
            let body = req.body.clone().unwrap_or_default();
            if body["get_svg"] == true {
                HttpResponse::Ok()
                    .content_type("text/html")
                    .body(r#"<html><body><svg width="100"><g id="rules"/></svg></body></html>"#)
            } else if body["download_rules_as_csv"] == true {
                HttpResponse::Ok()
                    .content_type("text/csv")
                    .body("source_table,source_field,term_mapping\nDemographics.csv,Sex,8507\n")
            } else {
                HttpResponse::InternalServerError().finish()
            }
        }

        ("GET", ["v2", "scanreports", _, "rules", "downloads", "5"]) => HttpResponse::Ok()
            .content_type("application/json")
            .insert_header((
                header::CONTENT_DISPOSITION,
                r#"attachment; filename="Rules - 1.json""#,
            ))
            .body(r#"{"rules": []}"#),

        ("GET", ["datasets", "4"]) => HttpResponse::Ok().json(json!({
            "id": 4,
            "name": "Health Study",
            "hidden": false,
            "data_partner": {"id": 2, "name": "University Hospital"}
        })),
        ("GET", ["datasets", "4", "permissions"]) => {
            HttpResponse::Ok().json(json!({"permissions": ["CanView"]}))
        }

        ("GET", ["projects"]) => {
            let projects = if params.get("dataset").map(String::as_str) == Some("4") {
                vec![json!({"id": 1, "name": "Cohort Project", "datasets": [4]})]
            } else {
                Vec::new()
            };
            HttpResponse::Ok().json(projects)
        }

        _ => not_found(),
    }
}

async fn dispatch(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<Arc<Mutex<MockState>>>,
) -> HttpResponse {
    let header_value = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let recorded = RecordedRequest {
        method: req.method().to_string(),
        path: req.path().to_string(),
        query: req.query_string().to_string(),
        cookie: header_value("cookie"),
        authorization: header_value("authorization"),
        csrf: header_value("x-csrftoken"),
        body: serde_json::from_slice(&body).ok(),
    };

    let mut state = state.lock().unwrap();
    let failure = state
        .fail_once
        .iter()
        .position(|(method, prefix)| *method == recorded.method && recorded.path.starts_with(prefix.as_str()));
    let response = match failure {
        Some(index) => {
            state.fail_once.remove(index);
            HttpResponse::InternalServerError().body("<h1>Server Error (500)</h1>")
        }
        None => handle(
            &recorded.method,
            &recorded.path,
            &recorded.query,
            &recorded,
            &mut state,
        ),
    };
    state.requests.push(recorded);
    response
}

impl MockBackend {
    /// Start the mock backend on an ephemeral port.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockState {
            joins: vec![join(10, 70, 8507, 23)],
            next_join_id: 11,
            requests: Vec::new(),
            fail_once: Vec::new(),
        }));

        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{}", port);

        let state_data = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(state_data.clone()))
                .default_service(web::route().to(dispatch))
        })
        .workers(1)
        .listen(listener)
        .expect("failed to listen")
        .disable_signals()
        .run();

        // Fire and forget; the server lives for the process lifetime
        tokio::spawn(server);

        MockBackend { url, state }
    }

    /// Requests seen so far whose path starts with `prefix`.
    pub fn requests_to(&self, method: &str, prefix: &str) -> Vec<RecordedRequest> {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Fail the next `method` request under `prefix` with a 500.
    pub fn fail_once(&self, method: &str, prefix: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_once
            .push((method.to_string(), prefix.to_string()));
    }

    pub fn join_count(&self) -> usize {
        self.state.lock().unwrap().joins.len()
    }
}
