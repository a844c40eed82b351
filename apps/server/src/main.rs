//! Carrot-Mapper web server - Main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::path::PathBuf;
use std::time::Duration;

use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::{App, HttpRequest, HttpServer, Result as ActixResult, http::header, web};
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use carrot_web_lib::api::{self, ApiDoc};
use carrot_web_lib::client::ApiClient;
use carrot_web_lib::config::{CSRF_HEADER, Config};
use carrot_web_lib::middleware::{REQUEST_ID_HEADER, RequestLogger};
use carrot_web_lib::services::ViewCache;

/// Static bundle directory, registered only when static serving is enabled.
#[derive(Clone)]
struct StaticDir(PathBuf);

/// SPA fallback handler - serves index.html for client-side routing.
async fn spa_fallback(req: HttpRequest) -> ActixResult<NamedFile> {
    let static_dir = req
        .app_data::<web::Data<StaticDir>>()
        .ok_or_else(|| actix_web::error::ErrorNotFound("Static files not configured"))?;
    Ok(NamedFile::open(static_dir.0.join("index.html"))?)
}

fn build_cors(is_development: bool, allowed_origin: Option<&str>) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
        .allowed_header(CSRF_HEADER)
        .expose_headers(vec![REQUEST_ID_HEADER])
        .supports_credentials()
        .max_age(3600);

    if is_development {
        cors = cors
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://127.0.0.1:3000");
    }
    if let Some(origin) = allowed_origin {
        cors = cors.allowed_origin(origin);
    }
    cors
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - CARROT_ENV must be set to 'development' or 'production'");
            error!("  - In production, CARROT_BACKEND_URL must point at the mapping backend");
            error!("  - CARROT_DEFAULT_PAGE_SIZE must be one of 10, 20, 30, 40, 50");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Carrot-Mapper Web");
    info!("  Environment: {}", config.environment);
    info!("  Backend API: {}", config.api_url(""));
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    let client = match ApiClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create backend client: {}", e);
            std::process::exit(1);
        }
    };

    let view_cache = ViewCache::new(Duration::from_secs(config.view_cache_ttl_secs));
    if view_cache.is_enabled() {
        info!("View cache enabled ({}s TTL)", config.view_cache_ttl_secs);
    } else {
        info!("View cache disabled");
    }

    // Prepare shared state
    let bind_address = config.bind_address();
    let static_dir = config.static_dir.clone();
    let is_development = config.is_development();
    let allowed_origin = config.allowed_origin.clone();

    if let Some(ref dir) = static_dir {
        info!("Static file serving enabled from {:?}", dir);
    }

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!("Starting server at http://{} ({} workers)", bind_address, cpus);
        cpus
    };

    let client = web::Data::new(client);
    let view_cache = web::Data::new(view_cache);
    let config = web::Data::new(config);

    // Start HTTP server
    let server = HttpServer::new(move || {
        let mut app = App::new()
            // Add CORS middleware (must be before other middleware)
            .wrap(build_cors(is_development, allowed_origin.as_deref()))
            // Add request logging middleware
            .wrap(RequestLogger)
            // Add shared state
            .app_data(client.clone())
            .app_data(view_cache.clone())
            .app_data(config.clone())
            // Configure API routes
            .service(web::scope("/api/v1").configure(api::configure_routes))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            );

        // Serve the renderer bundle (when CARROT_STATIC_DIR is set)
        if let Some(ref dir) = static_dir {
            app = app
                .app_data(web::Data::new(StaticDir(dir.clone())))
                // Serve static assets (js, css, images)
                .service(Files::new("/assets", dir.join("assets")).prefer_utf8(true))
                // SPA fallback - serve index.html for all other routes
                .default_service(web::route().to(spa_fallback));
        }

        app
    });

    // Set worker count
    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
