//! Health check and service index endpoints.

use actix_web::{HttpResponse, get, web};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::CaseService;

/// Health check response.
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    /// Configured backend (`postgres` or `memory`).
    storage: &'static str,
    database: &'static str,
    timestamp: String,
}

/// One entry in the service index.
#[derive(Serialize, ToSchema)]
pub struct EndpointInfo {
    method: &'static str,
    path: &'static str,
    description: &'static str,
}

/// Service index response.
#[derive(Serialize, ToSchema)]
pub struct ServerInfoResponse {
    name: &'static str,
    version: &'static str,
    storage: &'static str,
    endpoints: Vec<EndpointInfo>,
}

const ENDPOINTS: &[(&str, &str, &str)] = &[
    ("GET", "/api/v1/health", "Storage connectivity"),
    ("GET", "/api/v1/statistics", "Case counts by status and uploads"),
    ("GET", "/api/v1/cases", "List cases (?status=&doctor=)"),
    ("POST", "/api/v1/cases", "Create a case"),
    ("GET", "/api/v1/cases/status/{status}", "List cases in one status"),
    ("GET", "/api/v1/cases/{id}", "Get a case"),
    ("PUT", "/api/v1/cases/{id}", "Update patient, doctor or notes"),
    ("DELETE", "/api/v1/cases/{id}", "Delete a case"),
    ("PATCH", "/api/v1/cases/{id}/status", "Apply a workflow action"),
    ("PUT", "/api/v1/cases/{id}/treatment-plan", "Upload a treatment plan"),
    ("PATCH", "/api/v1/cases/{id}/approve", "Approve the plan"),
    ("PATCH", "/api/v1/cases/{id}/reject", "Reject the plan"),
    ("PATCH", "/api/v1/cases/{id}/request-revision", "Ask for a revised plan"),
    ("PUT", "/api/v1/cases/{id}/files", "Record raw uploads"),
    ("GET", "/api/v1/cases/{id}/actions", "Workflow actions allowed now"),
];

/// Health check endpoint.
///
/// Returns 200 when the case store is reachable, 503 otherwise.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Case store unreachable", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health(service: web::Data<CaseService>) -> HttpResponse {
    let store = service.store();
    let storage = store.backend().as_str();

    match store.ping().await {
        Ok(()) => HttpResponse::Ok().json(HealthResponse {
            status: "healthy",
            storage,
            database: "connected",
            timestamp: Utc::now().to_rfc3339(),
        }),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "unavailable",
                storage,
                database: "disconnected",
                timestamp: Utc::now().to_rfc3339(),
            })
        }
    }
}

/// Service index.
#[utoipa::path(
    get,
    path = "/api/v1/",
    tag = "Health",
    responses(
        (status = 200, description = "Service name, version and endpoints", body = ServerInfoResponse)
    )
)]
#[get("/")]
pub async fn info(service: web::Data<CaseService>) -> HttpResponse {
    HttpResponse::Ok().json(ServerInfoResponse {
        name: "Aligner Case Server",
        version: env!("CARGO_PKG_VERSION"),
        storage: service.store().backend().as_str(),
        endpoints: ENDPOINTS
            .iter()
            .map(|&(method, path, description)| EndpointInfo {
                method,
                path,
                description,
            })
            .collect(),
    })
}

/// Configure health routes.
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(info);
}
