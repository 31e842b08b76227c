//! Aligner case server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use actix_cors::Cors;
use actix_web::http::header::{self, HeaderName};
use actix_web::{App, HttpServer, web};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use aligner_cases_lib::api::{self, ApiDoc};
use aligner_cases_lib::config::Config;
use aligner_cases_lib::middleware::{self, REQUEST_ID_HEADER};
use aligner_cases_lib::services::CaseService;
use aligner_cases_lib::store;

/// Perform health check (for Docker healthcheck).
///
/// Loads the configuration and pings the configured store. Migrations are
/// left to server startup.
async fn health_check() -> bool {
    let Ok(config) = Config::from_env() else {
        return false;
    };
    store::probe(&config).await.is_ok()
}

fn build_cors(origins: &[String]) -> Cors {
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers(vec![HeaderName::from_static(REQUEST_ID_HEADER)])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Check for --health-check flag (used by Docker HEALTHCHECK)
    if std::env::args().any(|arg| arg == "--health-check") {
        dotenvy::dotenv().ok();
        std::process::exit(if health_check().await { 0 } else { 1 });
    }

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL must be set and CASES_STORAGE must be postgres");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Aligner Case Server");
    info!("  Environment: {}", config.environment);
    info!("  Storage: {}", config.storage);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    let case_store = match store::open(&config).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open {} case store: {}", config.storage, e);
            std::process::exit(1);
        }
    };
    info!("Case store ready ({})", config.storage);

    let service = web::Data::new(CaseService::new(case_store));
    let bind_address = config.bind_address();
    let cors_origins = config.cors_origins.clone();

    let worker_count = if config.is_development() {
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
    info!("API docs at http://{}/swagger-ui/", bind_address);

    HttpServer::new(move || {
        App::new()
            // CORS must wrap before other middleware
            .wrap(build_cors(&cors_origins))
            .wrap(middleware::RequestLogger)
            .app_data(service.clone())
            .app_data(api::json_config())
            .app_data(api::query_config())
            .service(web::scope("/api/v1").configure(api::configure_routes))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .workers(worker_count)
    .bind(&bind_address)?
    .run()
    .await
}
