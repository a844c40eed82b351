//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

/// Django session cookie forwarded to the backend.
pub const SESSION_COOKIE: &str = "sessionid";

/// Django CSRF cookie forwarded to the backend.
pub const CSRF_COOKIE: &str = "csrftoken";

/// Header carrying the CSRF token on mutating backend calls.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Page sizes the table renderer offers.
pub const PAGE_SIZES: [u32; 5] = [10, 20, 30, 40, 50];

/// Development default values - NEVER use in production.
pub mod defaults {
    pub const DEV_HOST: &str = "127.0.0.1";
    pub const DEV_PORT: u16 = 3000;
    pub const DEV_BACKEND_URL: &str = "http://localhost:8000";
    pub const LOGIN_PATH: &str = "/accounts/login/";
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    pub const VIEW_CACHE_TTL_SECS: u64 = 60;
    pub const DEFAULT_PAGE_SIZE: u32 = 20;
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Origin of the Django REST API (requests go to `{backend_url}/api/{path}`)
    pub backend_url: String,
    /// Where unauthenticated users are sent
    pub login_path: String,
    /// Total timeout for a single backend request
    pub request_timeout_secs: u64,
    /// Lifetime of cached composed views (0 disables caching)
    pub view_cache_ttl_secs: u64,
    /// Page size used when the query string does not carry `page_size`
    pub default_page_size: u32,
    /// Directory for the static table renderer bundle
    pub static_dir: Option<PathBuf>,
    /// Extra origin allowed by CORS
    pub allowed_origin: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CARROT_ENV`: Environment (development/production) - REQUIRED
    /// - `CARROT_HOST`: Server host (default: 127.0.0.1)
    /// - `CARROT_PORT`: Server port (default: 3000)
    /// - `CARROT_BACKEND_URL`: Django API origin (default: http://localhost:8000)
    /// - `CARROT_LOGIN_PATH`: Login page (default: /accounts/login/)
    /// - `CARROT_REQUEST_TIMEOUT_SECS`: Backend request timeout (default: 30)
    /// - `CARROT_VIEW_CACHE_TTL_SECS`: Composed view cache lifetime (default: 60)
    /// - `CARROT_DEFAULT_PAGE_SIZE`: One of 10, 20, 30, 40, 50 (default: 20)
    /// - `CARROT_STATIC_DIR`: Static renderer bundle directory
    /// - `CARROT_ALLOWED_ORIGIN`: Extra CORS origin
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_str =
            env::var("CARROT_ENV").map_err(|_| ConfigError::MissingEnvVar("CARROT_ENV"))?;

        let environment = Environment::parse(&env_str).ok_or(ConfigError::InvalidValue(
            "CARROT_ENV must be 'development' or 'production'",
        ))?;

        let host = env::var("CARROT_HOST").unwrap_or_else(|_| defaults::DEV_HOST.to_string());

        let port = env::var("CARROT_PORT")
            .unwrap_or_else(|_| defaults::DEV_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("CARROT_PORT must be a valid port number"))?;

        let backend_url = env::var("CARROT_BACKEND_URL")
            .unwrap_or_else(|_| defaults::DEV_BACKEND_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let login_path =
            env::var("CARROT_LOGIN_PATH").unwrap_or_else(|_| defaults::LOGIN_PATH.to_string());

        let request_timeout_secs = env::var("CARROT_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| defaults::REQUEST_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue("CARROT_REQUEST_TIMEOUT_SECS must be a valid number")
            })?;

        let view_cache_ttl_secs = env::var("CARROT_VIEW_CACHE_TTL_SECS")
            .unwrap_or_else(|_| defaults::VIEW_CACHE_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue("CARROT_VIEW_CACHE_TTL_SECS must be a valid number")
            })?;

        let default_page_size = env::var("CARROT_DEFAULT_PAGE_SIZE")
            .unwrap_or_else(|_| defaults::DEFAULT_PAGE_SIZE.to_string())
            .parse::<u32>()
            .map_err(|_| {
                ConfigError::InvalidValue("CARROT_DEFAULT_PAGE_SIZE must be a valid number")
            })?;

        let static_dir = env::var("CARROT_STATIC_DIR").ok().map(PathBuf::from);
        let allowed_origin = env::var("CARROT_ALLOWED_ORIGIN").ok();

        let config = Config {
            environment,
            host,
            port,
            backend_url,
            login_path,
            request_timeout_secs,
            view_cache_ttl_secs,
            default_page_size,
            static_dir,
            allowed_origin,
        };

        config.validate()?;

        if environment.is_production() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Checks that hold in every environment.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.backend_url.starts_with("http://") || self.backend_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "CARROT_BACKEND_URL must start with http:// or https://",
            ));
        }

        if !PAGE_SIZES.contains(&self.default_page_size) {
            return Err(ConfigError::InvalidValue(
                "CARROT_DEFAULT_PAGE_SIZE must be one of 10, 20, 30, 40, 50",
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "CARROT_REQUEST_TIMEOUT_SECS must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Validate that production configuration does not use development defaults.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.backend_url == defaults::DEV_BACKEND_URL {
            errors.push(format!(
                "CARROT_BACKEND_URL is using development default '{}'. Set the production API origin.",
                defaults::DEV_BACKEND_URL
            ));
        }

        if self.backend_url.starts_with("http://") {
            errors.push(
                "CARROT_BACKEND_URL must use https in production (session cookies are forwarded)."
                    .to_string(),
            );
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Full URL of a backend API path.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.backend_url, path.trim_start_matches('/'))
    }

    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}

#[cfg(test)]
pub(crate) fn test_config(backend_url: &str) -> Config {
    Config {
        environment: Environment::Development,
        host: "127.0.0.1".to_string(),
        port: 3000,
        backend_url: backend_url.to_string(),
        login_path: defaults::LOGIN_PATH.to_string(),
        request_timeout_secs: 5,
        view_cache_ttl_secs: 60,
        default_page_size: 20,
        static_dir: None,
        allowed_origin: None,
    }
}
