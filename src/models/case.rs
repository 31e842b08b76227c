//! Case domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Case status enum.
///
/// The closed set of workflow stages. Stored and serialized in snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    PendingTreatment,
    PendingApproval,
    Approved,
    Rejected,
    RevisionRequested,
}

impl CaseStatus {
    /// Every status, in workflow order.
    pub const ALL: [CaseStatus; 5] = [
        Self::PendingTreatment,
        Self::PendingApproval,
        Self::Approved,
        Self::Rejected,
        Self::RevisionRequested,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingTreatment => "pending_treatment",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::RevisionRequested => "revision_requested",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_treatment" => Some(Self::PendingTreatment),
            "pending_approval" => Some(Self::PendingApproval),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "revision_requested" => Some(Self::RevisionRequested),
            _ => None,
        }
    }

    /// Approved and rejected cases accept no further workflow actions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Patient attributes.
///
/// Only `name` is interpreted. Any other keys sent by the practice (age,
/// arch, ...) are kept as-is next to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Patient {
    /// Patient display name (required).
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: JsonMap<String, JsonValue>,
}

/// Treatment plan attached by an admin for doctor review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentPlan {
    /// Uploaded plan file references.
    pub files: Vec<String>,
    /// Admin who uploaded the current plan.
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
    /// 1 for the first upload, incremented for every revised upload.
    pub version: u32,
    #[serde(default)]
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rejected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    /// Notes from the most recent revision request. Kept across re-uploads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_requested_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_requested_at: Option<DateTime<Utc>>,
}

/// Upload state of one raw artifact slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileSlot {
    pub uploaded: bool,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl FileSlot {
    fn set(&mut self, files: Vec<String>, now: DateTime<Utc>) {
        self.uploaded = !files.is_empty();
        self.uploaded_at = self.uploaded.then_some(now);
        self.files = files;
    }
}

/// Raw artifacts supplied with the case (stored as JSONB).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadStatus {
    #[serde(default)]
    pub stl_files: FileSlot,
    #[serde(default)]
    pub prescription: FileSlot,
    #[serde(default)]
    pub photos: FileSlot,
}

impl FileUploadStatus {
    /// True when every slot has at least one file.
    pub fn is_complete(&self) -> bool {
        self.stl_files.uploaded && self.prescription.uploaded && self.photos.uploaded
    }

    /// Overwrite the slots present in `files`, leaving the others untouched.
    pub fn apply(&mut self, files: RawFiles, now: DateTime<Utc>) {
        if let Some(stl_files) = files.stl_files {
            self.stl_files.set(stl_files, now);
        }
        if let Some(prescription) = files.prescription {
            self.prescription.set(prescription, now);
        }
        if let Some(photos) = files.photos {
            self.photos.set(photos, now);
        }
    }
}

/// Raw file lists as sent by clients. Absent slots are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawFiles {
    #[serde(default)]
    pub stl_files: Option<Vec<String>>,
    #[serde(default)]
    pub prescription: Option<Vec<String>>,
    #[serde(default)]
    pub photos: Option<Vec<String>>,
}

impl RawFiles {
    pub fn is_empty(&self) -> bool {
        self.stl_files.is_none() && self.prescription.is_none() && self.photos.is_none()
    }

    /// Reject blank file references.
    pub fn validate(&self) -> AppResult<()> {
        let slots = [
            ("stlFiles", &self.stl_files),
            ("prescription", &self.prescription),
            ("photos", &self.photos),
        ];
        for (slot, files) in slots {
            if let Some(files) = files
                && files.iter().any(|f| f.trim().is_empty())
            {
                return Err(AppError::Validation(format!(
                    "{} contains an empty file reference",
                    slot
                )));
            }
        }
        Ok(())
    }
}

/// A treatment case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    /// Storage-assigned identifier (UUIDv7).
    pub id: Uuid,
    /// Human-readable business identifier, e.g. `CP-1760598000000`.
    pub case_id: String,
    pub status: CaseStatus,
    pub patient: Patient,
    pub doctor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_plan: Option<TreatmentPlan>,
    #[serde(default)]
    pub file_upload_status: FileUploadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How a caller identified a case.
///
/// Every operation resolves its path identifier through [`CaseLookup::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseLookup {
    /// Storage identifier.
    Id(Uuid),
    /// Business identifier (`caseId`).
    CaseId(String),
}

impl CaseLookup {
    /// A UUID selects by storage id; any other non-blank value selects by `caseId`.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AppError::Validation(
                "Case identifier must not be empty".to_string(),
            ));
        }
        match Uuid::parse_str(raw) {
            Ok(id) => Ok(Self::Id(id)),
            Err(_) => Ok(Self::CaseId(raw.to_string())),
        }
    }

    pub fn matches(&self, case: &Case) -> bool {
        match self {
            Self::Id(id) => case.id == *id,
            Self::CaseId(case_id) => case.case_id == *case_id,
        }
    }
}

impl std::fmt::Display for CaseLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::CaseId(case_id) => write!(f, "{}", case_id),
        }
    }
}

/// Filter for listing cases.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ListCasesQuery {
    /// Filter by status.
    #[serde(default)]
    pub status: Option<CaseStatus>,
    /// Filter by doctor (exact match).
    #[serde(default)]
    pub doctor: Option<String>,
}

/// Request to create a case.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseRequest {
    #[serde(default)]
    pub patient: Option<Patient>,
    #[serde(default)]
    pub doctor: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Raw artifacts submitted with the case.
    #[serde(default)]
    pub files: Option<RawFiles>,
}

/// General field update. Identifiers and workflow fields are not updatable.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCaseRequest {
    #[serde(default)]
    pub patient: Option<Patient>,
    #[serde(default)]
    pub doctor: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl UpdateCaseRequest {
    pub fn is_empty(&self) -> bool {
        self.patient.is_none() && self.doctor.is_none() && self.notes.is_none()
    }
}

/// Admin upload of a treatment plan.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadTreatmentPlanRequest {
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub uploaded_by: String,
}

/// Doctor approval.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    #[serde(default)]
    pub approved_by: String,
}

/// Doctor rejection.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    #[serde(default)]
    pub rejected_by: String,
    #[serde(default)]
    pub reason: String,
}

/// Doctor revision request.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestRevisionRequest {
    #[serde(default)]
    pub requested_by: String,
    #[serde(default)]
    pub notes: String,
}

/// Case list response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaseListResponse {
    pub cases: Vec<Case>,
    pub total: usize,
}
