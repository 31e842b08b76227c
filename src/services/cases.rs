//! Case operations.
//!
//! [`CaseService`] resolves identifiers, serializes mutations per case and
//! delegates status changes to the workflow engine.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{info, warn};
use uuid::Uuid;

use super::case_id::CaseIdGenerator;
use super::workflow::{self, CaseAction, CaseActionsResponse};
use crate::error::{AppError, AppResult};
use crate::models::{
    Case, CaseLookup, CaseStatistics, CaseStatus, CreateCaseRequest, FileUploadCounts,
    FileUploadStatus, ListCasesQuery, RawFiles, StatusCounts, UpdateCaseRequest,
};
use crate::store::CaseStore;

/// Number of idle lock entries tolerated before pruning.
const LOCK_PRUNE_THRESHOLD: usize = 1024;

/// One async mutex per case id.
#[derive(Default)]
struct CaseLocks {
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl CaseLocks {
    async fn acquire(&self, id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            if locks.len() >= LOCK_PRUNE_THRESHOLD {
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            Arc::clone(locks.entry(id).or_default())
        };
        lock.lock_owned().await
    }

    fn forget(&self, id: Uuid) {
        self.locks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id);
    }
}

/// Case workflow service shared by all request handlers.
pub struct CaseService {
    store: Arc<dyn CaseStore>,
    ids: CaseIdGenerator,
    locks: CaseLocks,
}

impl CaseService {
    pub fn new(store: Arc<dyn CaseStore>) -> Self {
        Self {
            store,
            ids: CaseIdGenerator::new(),
            locks: CaseLocks::default(),
        }
    }

    pub fn store(&self) -> &Arc<dyn CaseStore> {
        &self.store
    }

    /// Create a case in `pending_treatment`.
    pub async fn create_case(&self, req: CreateCaseRequest) -> AppResult<Case> {
        let patient = req
            .patient
            .filter(|p| !p.name.trim().is_empty())
            .ok_or_else(|| AppError::Validation("patient.name is required".to_string()))?;
        let doctor = non_blank(req.doctor, "doctor")?;

        let now = Utc::now();
        let mut file_upload_status = FileUploadStatus::default();
        if let Some(files) = req.files {
            files.validate()?;
            file_upload_status.apply(files, now);
        }

        let mut case = Case {
            id: Uuid::now_v7(),
            case_id: self.ids.next_id(),
            status: CaseStatus::PendingTreatment,
            patient: trim_patient(patient),
            doctor,
            notes: req.notes.and_then(trim_optional),
            treatment_plan: None,
            file_upload_status,
            created_at: now,
            updated_at: now,
        };

        // Ids only increase within this process; another instance or an
        // earlier run may already hold the one just generated.
        match self.store.insert(&case).await {
            Ok(()) => {}
            Err(AppError::Conflict(msg)) => {
                let taken = std::mem::replace(&mut case.case_id, self.ids.next_id());
                warn!(
                    case_id = %taken,
                    retry_with = %case.case_id,
                    "Case id already taken, retrying: {}",
                    msg
                );
                self.store.insert(&case).await?;
            }
            Err(e) => return Err(e),
        }

        info!(
            case_id = %case.case_id,
            doctor = %case.doctor,
            "Case created"
        );

        Ok(case)
    }

    /// Fetch one case by storage id or `caseId`.
    pub async fn get_case(&self, raw_id: &str) -> AppResult<Case> {
        let lookup = CaseLookup::parse(raw_id)?;
        self.find(&lookup).await
    }

    /// Workflow actions the case accepts in its current status.
    pub async fn allowed_actions(&self, raw_id: &str) -> AppResult<CaseActionsResponse> {
        let case = self.get_case(raw_id).await?;
        Ok(CaseActionsResponse::from(&case))
    }

    pub async fn list_cases(&self, filter: &ListCasesQuery) -> AppResult<Vec<Case>> {
        self.store.list(filter).await
    }

    /// Update descriptive fields. Identifiers and workflow fields are untouched.
    pub async fn update_case(&self, raw_id: &str, req: UpdateCaseRequest) -> AppResult<Case> {
        if req.is_empty() {
            return Err(AppError::Validation(
                "At least one of patient, doctor or notes must be provided".to_string(),
            ));
        }
        if let Some(ref patient) = req.patient
            && patient.name.trim().is_empty()
        {
            return Err(AppError::Validation(
                "patient.name must not be empty".to_string(),
            ));
        }
        let doctor = req.doctor.map(|d| non_blank(Some(d), "doctor")).transpose()?;

        self.mutate(raw_id, |case| {
            if let Some(patient) = req.patient {
                case.patient = trim_patient(patient);
            }
            if let Some(doctor) = doctor {
                case.doctor = doctor;
            }
            if let Some(notes) = req.notes {
                case.notes = trim_optional(notes);
            }
            case.updated_at = Utc::now();
            Ok(())
        })
        .await
    }

    /// Record raw artifacts (STL scans, prescription, photos).
    pub async fn record_files(&self, raw_id: &str, files: RawFiles) -> AppResult<Case> {
        if files.is_empty() {
            return Err(AppError::Validation(
                "At least one of stlFiles, prescription or photos must be provided".to_string(),
            ));
        }
        files.validate()?;

        self.mutate(raw_id, |case| {
            if case.status.is_terminal() {
                return Err(AppError::InvalidState(format!(
                    "Cannot change files of case {} while it is {}",
                    case.case_id, case.status
                )));
            }
            let now = Utc::now();
            case.file_upload_status.apply(files, now);
            case.updated_at = now;
            Ok(())
        })
        .await
    }

    pub async fn delete_case(&self, raw_id: &str) -> AppResult<()> {
        let lookup = CaseLookup::parse(raw_id)?;
        let case = self.find(&lookup).await?;

        let _guard = self.locks.acquire(case.id).await;
        if !self.store.delete(case.id).await? {
            return Err(AppError::NotFound(format!("Case {}", lookup)));
        }
        self.locks.forget(case.id);

        info!(case_id = %case.case_id, "Case deleted");
        Ok(())
    }

    /// Apply a workflow action. The single entry point for status changes.
    pub async fn transition(&self, raw_id: &str, action: CaseAction) -> AppResult<Case> {
        action.validate()?;

        let actor = action.actor().trim().to_string();
        let kind = action.kind();

        self.mutate(raw_id, |case| {
            match workflow::apply(case, action, Utc::now()) {
                Ok(t) => {
                    info!(
                        case_id = %case.case_id,
                        action = %t.action,
                        from = %t.from,
                        to = %t.to,
                        actor = %actor,
                        "Case status changed"
                    );
                    Ok(())
                }
                Err(e) => {
                    warn!(
                        case_id = %case.case_id,
                        action = %kind,
                        status = %case.status,
                        actor = %actor,
                        "Case transition refused: {}",
                        e
                    );
                    Err(e)
                }
            }
        })
        .await
    }

    pub async fn upload_treatment_plan(
        &self,
        raw_id: &str,
        files: Vec<String>,
        uploaded_by: String,
    ) -> AppResult<Case> {
        self.transition(raw_id, CaseAction::UploadTreatmentPlan { files, uploaded_by })
            .await
    }

    pub async fn approve(&self, raw_id: &str, approved_by: String) -> AppResult<Case> {
        self.transition(raw_id, CaseAction::Approve { approved_by })
            .await
    }

    pub async fn reject(
        &self,
        raw_id: &str,
        rejected_by: String,
        reason: String,
    ) -> AppResult<Case> {
        self.transition(
            raw_id,
            CaseAction::Reject {
                rejected_by,
                reason,
            },
        )
        .await
    }

    pub async fn request_revision(
        &self,
        raw_id: &str,
        requested_by: String,
        notes: String,
    ) -> AppResult<Case> {
        self.transition(
            raw_id,
            CaseAction::RequestRevision {
                requested_by,
                notes,
            },
        )
        .await
    }

    /// Counts by status and by raw upload slot.
    pub async fn statistics(&self) -> AppResult<CaseStatistics> {
        let mut by_status = StatusCounts::default();
        for (status, count) in self.store.count_by_status().await? {
            by_status.add(status, count);
        }

        let mut file_uploads = FileUploadCounts::default();
        for status in self.store.file_upload_statuses().await? {
            file_uploads.add(&status);
        }

        Ok(CaseStatistics {
            total: by_status.total(),
            by_status,
            file_uploads,
        })
    }

    async fn find(&self, lookup: &CaseLookup) -> AppResult<Case> {
        self.store
            .find(lookup)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Case {}", lookup)))
    }

    /// Read-modify-write under the case's lock. Nothing is written if `f` fails.
    async fn mutate<F>(&self, raw_id: &str, f: F) -> AppResult<Case>
    where
        F: FnOnce(&mut Case) -> AppResult<()>,
    {
        let lookup = CaseLookup::parse(raw_id)?;
        let id = self.find(&lookup).await?.id;

        let _guard = self.locks.acquire(id).await;
        // Re-read under the lock so concurrent writers see each other's changes.
        let mut case = self.find(&CaseLookup::Id(id)).await?;
        f(&mut case)?;
        self.store.save(&case).await?;

        Ok(case)
    }
}

fn non_blank(value: Option<String>, field: &str) -> AppResult<String> {
    value
        .and_then(trim_optional)
        .ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

fn trim_optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn trim_patient(mut patient: crate::models::Patient) -> crate::models::Patient {
    patient.name = patient.name.trim().to_string();
    patient
}
