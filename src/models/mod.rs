//! Domain models for the case server.

pub mod case;
pub mod statistics;

// Re-export commonly used types
pub use case::{
    ApproveRequest, Case, CaseListResponse, CaseLookup, CaseStatus, CreateCaseRequest, FileSlot,
    FileUploadStatus, ListCasesQuery, Patient, RawFiles, RejectRequest, RequestRevisionRequest,
    TreatmentPlan, UpdateCaseRequest, UploadTreatmentPlanRequest,
};
pub use statistics::{CaseStatistics, FileUploadCounts, StatusCounts};
