//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models, services};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Aligner Case Server",
        version = "0.1.0",
        description = "API server for aligner treatment cases and treatment-plan review"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::info,
        // Case endpoints
        api::cases::create_case,
        api::cases::list_cases,
        api::cases::list_cases_by_status,
        api::cases::get_case,
        api::cases::update_case,
        api::cases::delete_case,
        api::cases::record_files,
        // Workflow endpoints
        api::cases::transition_case,
        api::cases::upload_treatment_plan,
        api::cases::approve_case,
        api::cases::reject_case,
        api::cases::request_revision,
        api::cases::list_allowed_actions,
        // Statistics
        api::statistics::get_statistics,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::EndpointInfo,
            api::health::ServerInfoResponse,
            // Cases
            models::Case,
            models::CaseStatus,
            models::Patient,
            models::TreatmentPlan,
            models::FileSlot,
            models::FileUploadStatus,
            models::RawFiles,
            models::CreateCaseRequest,
            models::UpdateCaseRequest,
            models::CaseListResponse,
            models::ListCasesQuery,
            // Workflow
            services::ActionKind,
            services::TransitionRequest,
            services::CaseActionsResponse,
            models::UploadTreatmentPlanRequest,
            models::ApproveRequest,
            models::RejectRequest,
            models::RequestRevisionRequest,
            // Statistics
            models::CaseStatistics,
            models::StatusCounts,
            models::FileUploadCounts,
        )
    ),
    tags(
        (name = "Health", description = "Health check and service index"),
        (name = "Cases", description = "Case records"),
        (name = "Workflow", description = "Treatment plan upload and review"),
        (name = "Statistics", description = "Aggregate counts")
    )
)]
pub struct ApiDoc;
