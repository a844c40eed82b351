//! HTTP client for the Carrot-Mapper Django API.
//!
//! One `ApiClient` is shared by all workers; every incoming request gets an
//! `ApiSession` that forwards the caller's credentials.

mod error;

use reqwest::Method;
use reqwest::header::{
    AUTHORIZATION, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE, COOKIE, REFERER,
};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

pub use error::{ApiError, GENERIC_ERROR_MESSAGE, error_message_from_body};

use crate::auth::Credentials;
use crate::config::{CSRF_COOKIE, CSRF_HEADER, Config, SESSION_COOKIE};
use crate::models::PaginatedResponse;

/// HTTP connect timeout for backend calls.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Safety net against a backend that keeps returning `next` links.
const MAX_PAGES: usize = 1000;

/// Request body sent to the backend.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    Bytes { bytes: Vec<u8>, content_type: String },
}

/// Caching hint forwarded to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    #[default]
    Default,
    /// Bypass backend page caches (`Cache-Control: no-cache`).
    NoStore,
}

/// Options for a single backend call.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    /// Return the raw body as a [`Blob`].
    pub download: bool,
    pub cache: CacheMode,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
            download: false,
            cache: CacheMode::Default,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    pub fn post_json(body: serde_json::Value) -> Self {
        Self::json(Method::POST, body)
    }

    pub fn patch_json(body: serde_json::Value) -> Self {
        Self::json(Method::PATCH, body)
    }

    pub fn json(method: Method, body: serde_json::Value) -> Self {
        Self {
            method,
            body: Some(RequestBody::Json(body)),
            ..Self::default()
        }
    }

    pub fn download(mut self) -> Self {
        self.download = true;
        self
    }

    pub fn no_store(mut self) -> Self {
        self.cache = CacheMode::NoStore;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Raw bytes returned by a download request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub content_type: String,
    /// Filename announced by `Content-Disposition`, if any.
    pub filename: Option<String>,
}

/// Decoded body of a successful backend response.
#[derive(Debug, Clone)]
pub enum ApiBody {
    Json(serde_json::Value),
    /// HTTP 204 (or an empty JSON body).
    Empty,
    Blob(Blob),
    Text(String),
}

/// Shared backend client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    backend_url: String,
}

impl ApiClient {
    /// Build the client with the configured timeouts.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("carrot-mapper-web/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            backend_url: config.backend_url.clone(),
        })
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// Bind the caller's credentials for the duration of one request.
    pub fn session(&self, credentials: Credentials) -> ApiSession {
        ApiSession {
            http: self.http.clone(),
            backend_url: self.backend_url.clone(),
            credentials,
            degraded: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Check the backend answers at all. Any HTTP status counts as reachable.
    pub async fn ping(&self) -> Result<(), ApiError> {
        self.http
            .get(resolve_url(&self.backend_url, ""))
            .send()
            .await
            .map(|_| ())
            .map_err(ApiError::from)
    }
}

/// Backend client bound to one caller's credentials.
#[derive(Clone)]
pub struct ApiSession {
    http: reqwest::Client,
    backend_url: String,
    credentials: Credentials,
    /// Set once a soft accessor replaced a failed call with its default.
    degraded: Arc<AtomicBool>,
}

impl std::fmt::Debug for ApiSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSession")
            .field("backend_url", &self.backend_url)
            .field("credentials", &self.credentials)
            .field("degraded", &self.is_degraded())
            .finish()
    }
}

impl ApiSession {
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Whether any data read through this session is a fallback default.
    /// Such views are served but never cached.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    pub(crate) fn mark_degraded(&self) {
        self.degraded.store(true, Ordering::Relaxed);
    }

    /// Attach the caller's credentials to an outgoing request.
    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Credentials::Session {
                session_id,
                csrf_token,
            } => {
                let csrf = csrf_token
                    .as_ref()
                    .map(|t| t.expose_secret().to_string())
                    .unwrap_or_default();
                builder
                    .header(
                        COOKIE,
                        format!(
                            "{}={}; {}={}",
                            SESSION_COOKIE,
                            session_id.expose_secret(),
                            CSRF_COOKIE,
                            csrf
                        ),
                    )
                    .header(CSRF_HEADER, csrf)
                    .header(REFERER, self.backend_url.as_str())
            }
            Credentials::Bearer(token) => {
                builder.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()))
            }
        }
    }

    /// Issue a backend call and decode the body according to `options`.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<ApiBody, ApiError> {
        let url = resolve_url(&self.backend_url, path);
        debug!(method = %options.method, path = %path, "Backend request");

        let mut builder = self.authorize(self.http.request(options.method.clone(), &url));

        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if options.cache == CacheMode::NoStore {
            builder = builder.header(CACHE_CONTROL, "no-cache");
        }

        builder = match options.body {
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Bytes {
                bytes,
                content_type,
            }) => builder.header(CONTENT_TYPE, content_type).body(bytes),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message_from_body(content_type.as_deref(), &body),
            });
        }

        if options.download {
            let filename = response
                .headers()
                .get(CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok())
                .and_then(filename_from_disposition);
            let bytes = response.bytes().await?;
            return Ok(ApiBody::Blob(Blob {
                bytes: bytes.to_vec(),
                content_type: content_type
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
                filename,
            }));
        }

        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(ApiBody::Empty);
        }

        if content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
        {
            let bytes = response.bytes().await?;
            if bytes.is_empty() {
                return Ok(ApiBody::Empty);
            }
            return Ok(ApiBody::Json(serde_json::from_slice(&bytes)?));
        }

        Ok(ApiBody::Text(response.text().await?))
    }

    /// Issue a call and deserialize the JSON body. A 204 decodes from `{}`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        match self.request(path, options).await? {
            ApiBody::Json(value) => Ok(serde_json::from_value(value)?),
            ApiBody::Empty => Ok(serde_json::from_value(serde_json::json!({}))?),
            ApiBody::Text(text) => Err(ApiError::UnexpectedBody(format!(
                "expected JSON from {path}, got {} bytes of text",
                text.len()
            ))),
            ApiBody::Blob(blob) => Err(ApiError::UnexpectedBody(format!(
                "expected JSON from {path}, got {}",
                blob.content_type
            ))),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request_json(path, RequestOptions::get()).await
    }

    /// Send a JSON body and deserialize the JSON answer.
    pub async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        self.request_json(path, RequestOptions::json(method, body))
            .await
    }

    /// Issue a call whose body is irrelevant to the caller.
    pub async fn send(&self, path: &str, options: RequestOptions) -> Result<(), ApiError> {
        self.request(path, options).await.map(|_| ())
    }

    /// Fetch the raw body of a call.
    pub async fn download(&self, path: &str, options: RequestOptions) -> Result<Blob, ApiError> {
        match self.request(path, options.download()).await? {
            ApiBody::Blob(blob) => Ok(blob),
            _ => Err(ApiError::UnexpectedBody(format!(
                "expected a file from {path}"
            ))),
        }
    }

    /// Fetch a list endpoint that answers with either a bare array or a
    /// paginated envelope. Envelopes are followed to the last page.
    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        self.get_list_with(path, RequestOptions::get()).await
    }

    /// Like [`get_list`](Self::get_list), bypassing intermediate HTTP caches.
    /// Used for job progress, which changes while a view is open.
    pub async fn get_fresh_list<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, ApiError> {
        self.get_list_with(path, RequestOptions::get().no_store())
            .await
    }

    async fn get_list_with<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Vec<T>, ApiError> {
        let value: serde_json::Value = self.request_json(path, options).await?;
        if value.is_array() {
            return Ok(serde_json::from_value(value)?);
        }

        let page: PaginatedResponse<T> = serde_json::from_value(value)?;
        let mut results = page.results;
        if let Some(next) = page.next {
            results.extend(self.fetch_all_pages::<T>(&next).await?);
        }
        Ok(results)
    }

    /// Follow `next` links and concatenate every page's `results`.
    pub async fn fetch_all_pages<T: DeserializeOwned>(
        &self,
        initial_path: &str,
    ) -> Result<Vec<T>, ApiError> {
        let mut next = Some(initial_path.to_string());
        let mut all_results = Vec::new();
        let mut pages = 0;

        while let Some(path) = next {
            let page: PaginatedResponse<T> = self.get(&path).await?;
            all_results.extend(page.results);
            next = page.next;

            pages += 1;
            if pages >= MAX_PAGES {
                return Err(ApiError::Decode(format!(
                    "{initial_path} did not terminate after {MAX_PAGES} pages"
                )));
            }
        }

        Ok(all_results)
    }
}

/// Resolve a relative API path, or rebase an absolute `next` link, onto the
/// configured backend origin.
pub fn resolve_url(backend_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return match path.find("/api/") {
            Some(pos) => format!("{}{}", backend_url, &path[pos..]),
            None => path.to_string(),
        };
    }

    format!("{}/api/{}", backend_url, path.trim_start_matches('/'))
}

/// Extract `filename` from a `Content-Disposition` header value.
fn filename_from_disposition(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
