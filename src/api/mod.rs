//! API endpoint modules.

pub mod cases;
pub mod health;
pub mod openapi;
pub mod statistics;

use actix_web::web;

use crate::error::{json_error_handler, query_error_handler};

pub use cases::configure_routes as configure_case_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use statistics::configure_routes as configure_statistics_routes;

/// Register every `/api/v1` route.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_health_routes)
        .configure(configure_statistics_routes)
        .configure(configure_case_routes);
}

/// JSON body extractor config that reports malformed bodies as `VALIDATION_ERROR`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

/// Query-string counterpart of [`json_config`].
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error_handler)
}
