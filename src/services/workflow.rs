//! Case status workflow.
//!
//! Owns the transition table and applies actions to a case record. Every
//! status change in the server goes through [`apply`]; there is no raw
//! status assignment.
//!
//! ```text
//! pending_treatment --upload--> pending_approval --approve--> approved
//!                                 |    ^          --reject---> rejected
//!                   request_revision   | upload
//!                                 v    |
//!                            revision_requested
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::models::{Case, CaseStatus, TreatmentPlan};

/// Workflow action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Admin attaches (or re-attaches) a treatment plan.
    UploadTreatmentPlan,
    Approve,
    Reject,
    RequestRevision,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        Self::UploadTreatmentPlan,
        Self::Approve,
        Self::Reject,
        Self::RequestRevision,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UploadTreatmentPlan => "upload_treatment_plan",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::RequestRevision => "request_revision",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Target status for `action` taken from `from`, or `None` if the table has no such edge.
pub fn next_status(from: CaseStatus, action: ActionKind) -> Option<CaseStatus> {
    use ActionKind::*;
    use CaseStatus::*;

    match (from, action) {
        (PendingTreatment, UploadTreatmentPlan) => Some(PendingApproval),
        (RevisionRequested, UploadTreatmentPlan) => Some(PendingApproval),
        (PendingApproval, Approve) => Some(Approved),
        (PendingApproval, Reject) => Some(Rejected),
        (PendingApproval, RequestRevision) => Some(RevisionRequested),
        _ => None,
    }
}

/// Actions permitted from `status`.
pub fn allowed_actions(status: CaseStatus) -> Vec<ActionKind> {
    ActionKind::ALL
        .into_iter()
        .filter(|action| next_status(status, *action).is_some())
        .collect()
}

/// A workflow action with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseAction {
    UploadTreatmentPlan {
        files: Vec<String>,
        uploaded_by: String,
    },
    Approve {
        approved_by: String,
    },
    Reject {
        rejected_by: String,
        reason: String,
    },
    RequestRevision {
        requested_by: String,
        notes: String,
    },
}

impl CaseAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::UploadTreatmentPlan { .. } => ActionKind::UploadTreatmentPlan,
            Self::Approve { .. } => ActionKind::Approve,
            Self::Reject { .. } => ActionKind::Reject,
            Self::RequestRevision { .. } => ActionKind::RequestRevision,
        }
    }

    pub fn actor(&self) -> &str {
        match self {
            Self::UploadTreatmentPlan { uploaded_by, .. } => uploaded_by,
            Self::Approve { approved_by } => approved_by,
            Self::Reject { rejected_by, .. } => rejected_by,
            Self::RequestRevision { requested_by, .. } => requested_by,
        }
    }

    /// Payload checks that do not depend on the case's current state.
    pub fn validate(&self) -> AppResult<()> {
        require_non_blank(self.actor(), "actor")?;
        match self {
            Self::UploadTreatmentPlan { files, .. } => {
                if files.is_empty() {
                    return Err(AppError::Validation(
                        "Treatment plan must include at least one file".to_string(),
                    ));
                }
                if files.iter().any(|f| f.trim().is_empty()) {
                    return Err(AppError::Validation(
                        "Treatment plan contains an empty file reference".to_string(),
                    ));
                }
            }
            Self::Reject { reason, .. } => require_non_blank(reason, "reason")?,
            Self::RequestRevision { notes, .. } => require_non_blank(notes, "notes")?,
            Self::Approve { .. } => {}
        }
        Ok(())
    }
}

/// Generic transition body: `{ "action": "reject", "actor": "Dr. X", "reason": "..." }`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransitionRequest {
    pub action: ActionKind,
    #[serde(default)]
    pub actor: String,
    /// Plan files, for `upload_treatment_plan`.
    #[serde(default)]
    pub files: Vec<String>,
    /// Rejection reason, for `reject`.
    #[serde(default)]
    pub reason: Option<String>,
    /// Revision notes, for `request_revision`.
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<TransitionRequest> for CaseAction {
    fn from(req: TransitionRequest) -> Self {
        match req.action {
            ActionKind::UploadTreatmentPlan => Self::UploadTreatmentPlan {
                files: req.files,
                uploaded_by: req.actor,
            },
            ActionKind::Approve => Self::Approve {
                approved_by: req.actor,
            },
            ActionKind::Reject => Self::Reject {
                rejected_by: req.actor,
                reason: req.reason.unwrap_or_default(),
            },
            ActionKind::RequestRevision => Self::RequestRevision {
                requested_by: req.actor,
                notes: req.notes.unwrap_or_default(),
            },
        }
    }
}

/// Actions a case currently accepts.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseActionsResponse {
    pub case_id: String,
    pub status: CaseStatus,
    /// Empty once the case is approved or rejected.
    pub allowed_actions: Vec<ActionKind>,
}

impl From<&Case> for CaseActionsResponse {
    fn from(case: &Case) -> Self {
        Self {
            case_id: case.case_id.clone(),
            status: case.status,
            allowed_actions: allowed_actions(case.status),
        }
    }
}

/// Outcome of a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub action: ActionKind,
    pub from: CaseStatus,
    pub to: CaseStatus,
}

/// Apply `action` to `case` at time `now`.
///
/// On error the case is left untouched.
pub fn apply(case: &mut Case, action: CaseAction, now: DateTime<Utc>) -> AppResult<Transition> {
    action.validate()?;

    let kind = action.kind();
    let from = case.status;
    let to = next_status(from, kind).ok_or_else(|| {
        AppError::InvalidState(format!(
            "Cannot {} case {} while it is {}",
            kind, case.case_id, from
        ))
    })?;

    match action {
        CaseAction::UploadTreatmentPlan { files, uploaded_by } => {
            let previous = case.treatment_plan.take();
            let version = previous.as_ref().map_or(1, |plan| plan.version + 1);
            // Decision fields reset; the last revision notes stay for reference.
            case.treatment_plan = Some(TreatmentPlan {
                files,
                uploaded_by: uploaded_by.trim().to_string(),
                uploaded_at: now,
                version,
                revision_notes: previous.as_ref().and_then(|p| p.revision_notes.clone()),
                revision_requested_by: previous
                    .as_ref()
                    .and_then(|p| p.revision_requested_by.clone()),
                revision_requested_at: previous.and_then(|p| p.revision_requested_at),
                ..Default::default()
            });
        }
        CaseAction::Approve { approved_by } => {
            let plan = plan_mut(case)?;
            plan.approved = true;
            plan.approved_by = Some(approved_by.trim().to_string());
            plan.approved_at = Some(now);
        }
        CaseAction::Reject {
            rejected_by,
            reason,
        } => {
            let plan = plan_mut(case)?;
            plan.rejected = true;
            plan.rejected_by = Some(rejected_by.trim().to_string());
            plan.rejected_at = Some(now);
            plan.rejection_reason = Some(reason.trim().to_string());
        }
        CaseAction::RequestRevision {
            requested_by,
            notes,
        } => {
            let plan = plan_mut(case)?;
            plan.revision_notes = Some(notes.trim().to_string());
            plan.revision_requested_by = Some(requested_by.trim().to_string());
            plan.revision_requested_at = Some(now);
        }
    }

    case.status = to;
    case.updated_at = now;

    Ok(Transition {
        action: kind,
        from,
        to,
    })
}

fn plan_mut(case: &mut Case) -> AppResult<&mut TreatmentPlan> {
    let case_id = case.case_id.clone();
    case.treatment_plan.as_mut().ok_or_else(|| {
        AppError::InvalidState(format!("Case {} has no treatment plan", case_id))
    })
}

fn require_non_blank(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}
