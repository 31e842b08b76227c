//! Aggregate statistics endpoint.

use actix_web::{HttpResponse, get, web};

use crate::error::AppResult;
use crate::models::CaseStatistics;
use crate::services::CaseService;

/// Case counts by status and raw upload slot.
///
/// GET /statistics
#[utoipa::path(
    get,
    path = "/api/v1/statistics",
    tag = "Statistics",
    responses(
        (status = 200, description = "Case statistics", body = CaseStatistics),
        (status = 503, description = "Case store unreachable", body = crate::error::ErrorResponse)
    )
)]
#[get("/statistics")]
pub async fn get_statistics(service: web::Data<CaseService>) -> AppResult<HttpResponse> {
    let stats = service.statistics().await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Configure statistics routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_statistics);
}
