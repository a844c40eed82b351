//! Shared test helpers for view E2E tests.

use actix_web::cookie::Cookie;
use actix_web::{App, dev::ServiceResponse, test, web};
use carrot_web_lib::api;
use carrot_web_lib::client::ApiClient;
use carrot_web_lib::config::{Config, Environment, SESSION_COOKIE};
use carrot_web_lib::services::ViewCache;
use serde_json::Value;
use std::time::Duration;

use super::mock_backend::{MockBackend, VALID_SESSION};

/// Login page configured for the test app.
pub const TEST_LOGIN_PATH: &str = "/accounts/login/";

/// Config pointing at a mock backend.
pub fn test_config(backend_url: &str) -> Config {
    Config {
        environment: Environment::Development,
        host: "127.0.0.1".to_string(),
        port: 0,
        backend_url: backend_url.to_string(),
        login_path: TEST_LOGIN_PATH.to_string(),
        request_timeout_secs: 5,
        view_cache_ttl_secs: 60,
        default_page_size: 20,
        static_dir: None,
        allowed_origin: None,
    }
}

/// Start a fresh mock backend. Each test gets its own join state.
pub async fn start_backend() -> MockBackend {
    MockBackend::start().await
}

/// Create a test app wired against `backend`.
pub async fn create_test_app(
    backend: &MockBackend,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    let config = test_config(&backend.url);
    let client = ApiClient::new(&config).expect("client");
    let cache = ViewCache::new(Duration::from_secs(config.view_cache_ttl_secs));

    test::init_service(
        App::new()
            .app_data(web::Data::new(client))
            .app_data(web::Data::new(cache))
            .app_data(web::Data::new(config))
            .service(web::scope("/api/v1").configure(api::configure_routes)),
    )
    .await
}

/// Session cookie the mock backend accepts.
pub fn session_cookie() -> Cookie<'static> {
    Cookie::new(SESSION_COOKIE, VALID_SESSION)
}

/// GET `uri` with the valid session cookie.
pub fn get(uri: &str) -> test::TestRequest {
    test::TestRequest::get().uri(uri).cookie(session_cookie())
}

/// Read a response body as JSON.
pub async fn json_body(resp: ServiceResponse) -> Value {
    let body = test::read_body(resp).await;
    serde_json::from_slice(&body).expect("JSON body")
}
