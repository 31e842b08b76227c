//! Case API endpoints.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};

use crate::error::{AppError, AppResult};
use crate::models::{
    ApproveRequest, CaseListResponse, CaseStatus, CreateCaseRequest, ListCasesQuery, RawFiles,
    RejectRequest, RequestRevisionRequest, UpdateCaseRequest, UploadTreatmentPlanRequest,
};
use crate::services::{CaseActionsResponse, CaseService, TransitionRequest};

/// Configure case routes.
/// Note: More specific routes must be registered before generic ones.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_cases)
        .service(create_case)
        // Specific paths first
        .service(list_cases_by_status)
        .service(transition_case)
        .service(upload_treatment_plan)
        .service(approve_case)
        .service(reject_case)
        .service(request_revision)
        .service(record_files)
        .service(list_allowed_actions)
        // Generic paths last
        .service(get_case)
        .service(update_case)
        .service(delete_case);
}

/// Create a case.
///
/// POST /cases
#[utoipa::path(
    post,
    path = "/api/v1/cases",
    tag = "Cases",
    request_body = CreateCaseRequest,
    responses(
        (status = 201, description = "Case created", body = crate::models::Case),
        (status = 400, description = "Missing patient name or doctor", body = crate::error::ErrorResponse),
        (status = 409, description = "Duplicate case id", body = crate::error::ErrorResponse)
    )
)]
#[post("/cases")]
pub async fn create_case(
    service: web::Data<CaseService>,
    body: web::Json<CreateCaseRequest>,
) -> AppResult<HttpResponse> {
    let case = service.create_case(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(case))
}

/// List cases, newest first.
///
/// GET /cases?status=pending_approval&doctor=Dr.%20X
#[utoipa::path(
    get,
    path = "/api/v1/cases",
    tag = "Cases",
    params(
        ("status" = Option<CaseStatus>, Query, description = "Filter by status"),
        ("doctor" = Option<String>, Query, description = "Filter by doctor (exact match)")
    ),
    responses(
        (status = 200, description = "List of cases", body = CaseListResponse),
        (status = 400, description = "Unknown status", body = crate::error::ErrorResponse)
    )
)]
#[get("/cases")]
pub async fn list_cases(
    service: web::Data<CaseService>,
    query: web::Query<ListCasesQuery>,
) -> AppResult<HttpResponse> {
    let cases = service.list_cases(&query).await?;
    Ok(HttpResponse::Ok().json(CaseListResponse {
        total: cases.len(),
        cases,
    }))
}

/// List cases in one status.
///
/// GET /cases/status/{status}
#[utoipa::path(
    get,
    path = "/api/v1/cases/status/{status}",
    tag = "Cases",
    params(
        ("status" = String, Path, description = "Case status, e.g. pending_approval")
    ),
    responses(
        (status = 200, description = "List of cases", body = CaseListResponse),
        (status = 400, description = "Unknown status", body = crate::error::ErrorResponse)
    )
)]
#[get("/cases/status/{status}")]
pub async fn list_cases_by_status(
    service: web::Data<CaseService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let raw = path.into_inner();
    let status = CaseStatus::parse(&raw)
        .ok_or_else(|| AppError::Validation(format!("Unknown case status '{}'", raw)))?;

    let filter = ListCasesQuery {
        status: Some(status),
        doctor: None,
    };
    let cases = service.list_cases(&filter).await?;
    Ok(HttpResponse::Ok().json(CaseListResponse {
        total: cases.len(),
        cases,
    }))
}

/// Get a case by storage id or case id.
///
/// GET /cases/{id}
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}",
    tag = "Cases",
    params(
        ("id" = String, Path, description = "Case UUID or case id (CP-...)")
    ),
    responses(
        (status = 200, description = "Case details", body = crate::models::Case),
        (status = 404, description = "Case not found", body = crate::error::ErrorResponse)
    )
)]
#[get("/cases/{id}")]
pub async fn get_case(
    service: web::Data<CaseService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let case = service.get_case(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(case))
}

/// Update patient, doctor or notes.
///
/// PUT /cases/{id}
#[utoipa::path(
    put,
    path = "/api/v1/cases/{id}",
    tag = "Cases",
    params(
        ("id" = String, Path, description = "Case UUID or case id (CP-...)")
    ),
    request_body = UpdateCaseRequest,
    responses(
        (status = 200, description = "Case updated", body = crate::models::Case),
        (status = 400, description = "Invalid update", body = crate::error::ErrorResponse),
        (status = 404, description = "Case not found", body = crate::error::ErrorResponse)
    )
)]
#[put("/cases/{id}")]
pub async fn update_case(
    service: web::Data<CaseService>,
    path: web::Path<String>,
    body: web::Json<UpdateCaseRequest>,
) -> AppResult<HttpResponse> {
    let case = service
        .update_case(&path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(case))
}

/// Delete a case.
///
/// DELETE /cases/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/cases/{id}",
    tag = "Cases",
    params(
        ("id" = String, Path, description = "Case UUID or case id (CP-...)")
    ),
    responses(
        (status = 204, description = "Case deleted"),
        (status = 404, description = "Case not found", body = crate::error::ErrorResponse)
    )
)]
#[delete("/cases/{id}")]
pub async fn delete_case(
    service: web::Data<CaseService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    service.delete_case(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Apply a workflow action.
///
/// PATCH /cases/{id}/status
///
/// Status cannot be assigned directly; the body names an action
/// (`upload_treatment_plan`, `approve`, `reject`, `request_revision`) and the
/// target status follows from the transition table.
#[utoipa::path(
    patch,
    path = "/api/v1/cases/{id}/status",
    tag = "Workflow",
    params(
        ("id" = String, Path, description = "Case UUID or case id (CP-...)")
    ),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Transition applied", body = crate::models::Case),
        (status = 400, description = "Invalid action payload", body = crate::error::ErrorResponse),
        (status = 404, description = "Case not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Action not allowed in current status", body = crate::error::ErrorResponse)
    )
)]
#[patch("/cases/{id}/status")]
pub async fn transition_case(
    service: web::Data<CaseService>,
    path: web::Path<String>,
    body: web::Json<TransitionRequest>,
) -> AppResult<HttpResponse> {
    let case = service
        .transition(&path.into_inner(), body.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(case))
}

/// Admin uploads a treatment plan.
///
/// PUT /cases/{id}/treatment-plan
#[utoipa::path(
    put,
    path = "/api/v1/cases/{id}/treatment-plan",
    tag = "Workflow",
    params(
        ("id" = String, Path, description = "Case UUID or case id (CP-...)")
    ),
    request_body = UploadTreatmentPlanRequest,
    responses(
        (status = 200, description = "Plan uploaded, case pending approval", body = crate::models::Case),
        (status = 400, description = "No files or uploader", body = crate::error::ErrorResponse),
        (status = 404, description = "Case not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Case is not awaiting a plan", body = crate::error::ErrorResponse)
    )
)]
#[put("/cases/{id}/treatment-plan")]
pub async fn upload_treatment_plan(
    service: web::Data<CaseService>,
    path: web::Path<String>,
    body: web::Json<UploadTreatmentPlanRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let case = service
        .upload_treatment_plan(&path.into_inner(), req.files, req.uploaded_by)
        .await?;
    Ok(HttpResponse::Ok().json(case))
}

/// Doctor approves the treatment plan.
///
/// PATCH /cases/{id}/approve
#[utoipa::path(
    patch,
    path = "/api/v1/cases/{id}/approve",
    tag = "Workflow",
    params(
        ("id" = String, Path, description = "Case UUID or case id (CP-...)")
    ),
    request_body = ApproveRequest,
    responses(
        (status = 200, description = "Case approved", body = crate::models::Case),
        (status = 404, description = "Case not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Case is not pending approval", body = crate::error::ErrorResponse)
    )
)]
#[patch("/cases/{id}/approve")]
pub async fn approve_case(
    service: web::Data<CaseService>,
    path: web::Path<String>,
    body: web::Json<ApproveRequest>,
) -> AppResult<HttpResponse> {
    let case = service
        .approve(&path.into_inner(), body.into_inner().approved_by)
        .await?;
    Ok(HttpResponse::Ok().json(case))
}

/// Doctor rejects the treatment plan.
///
/// PATCH /cases/{id}/reject
#[utoipa::path(
    patch,
    path = "/api/v1/cases/{id}/reject",
    tag = "Workflow",
    params(
        ("id" = String, Path, description = "Case UUID or case id (CP-...)")
    ),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Case rejected", body = crate::models::Case),
        (status = 400, description = "Missing reason", body = crate::error::ErrorResponse),
        (status = 404, description = "Case not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Case is not pending approval", body = crate::error::ErrorResponse)
    )
)]
#[patch("/cases/{id}/reject")]
pub async fn reject_case(
    service: web::Data<CaseService>,
    path: web::Path<String>,
    body: web::Json<RejectRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let case = service
        .reject(&path.into_inner(), req.rejected_by, req.reason)
        .await?;
    Ok(HttpResponse::Ok().json(case))
}

/// Doctor asks for a revised plan.
///
/// PATCH /cases/{id}/request-revision
#[utoipa::path(
    patch,
    path = "/api/v1/cases/{id}/request-revision",
    tag = "Workflow",
    params(
        ("id" = String, Path, description = "Case UUID or case id (CP-...)")
    ),
    request_body = RequestRevisionRequest,
    responses(
        (status = 200, description = "Revision requested", body = crate::models::Case),
        (status = 400, description = "Missing notes", body = crate::error::ErrorResponse),
        (status = 404, description = "Case not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Case is not pending approval", body = crate::error::ErrorResponse)
    )
)]
#[patch("/cases/{id}/request-revision")]
pub async fn request_revision(
    service: web::Data<CaseService>,
    path: web::Path<String>,
    body: web::Json<RequestRevisionRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let case = service
        .request_revision(&path.into_inner(), req.requested_by, req.notes)
        .await?;
    Ok(HttpResponse::Ok().json(case))
}

/// Record raw artifacts (STL scans, prescription, photos).
///
/// PUT /cases/{id}/files
#[utoipa::path(
    put,
    path = "/api/v1/cases/{id}/files",
    tag = "Cases",
    params(
        ("id" = String, Path, description = "Case UUID or case id (CP-...)")
    ),
    request_body = RawFiles,
    responses(
        (status = 200, description = "File upload status updated", body = crate::models::Case),
        (status = 400, description = "No slots given", body = crate::error::ErrorResponse),
        (status = 404, description = "Case not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Case is closed", body = crate::error::ErrorResponse)
    )
)]
#[put("/cases/{id}/files")]
pub async fn record_files(
    service: web::Data<CaseService>,
    path: web::Path<String>,
    body: web::Json<RawFiles>,
) -> AppResult<HttpResponse> {
    let case = service
        .record_files(&path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(case))
}

/// Workflow actions the case accepts right now.
///
/// GET /cases/{id}/actions
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}/actions",
    tag = "Workflow",
    params(
        ("id" = String, Path, description = "Case UUID or case id (CP-...)")
    ),
    responses(
        (status = 200, description = "Current status and allowed actions", body = CaseActionsResponse),
        (status = 404, description = "Case not found", body = crate::error::ErrorResponse)
    )
)]
#[get("/cases/{id}/actions")]
pub async fn list_allowed_actions(
    service: web::Data<CaseService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let actions = service.allowed_actions(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(actions))
}
