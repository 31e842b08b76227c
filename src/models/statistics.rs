//! Aggregate case statistics.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CaseStatus, FileUploadStatus};

/// Number of cases in each workflow status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusCounts {
    pub pending_treatment: u64,
    pub pending_approval: u64,
    pub approved: u64,
    pub rejected: u64,
    pub revision_requested: u64,
}

impl StatusCounts {
    pub fn add(&mut self, status: CaseStatus, count: u64) {
        let slot = match status {
            CaseStatus::PendingTreatment => &mut self.pending_treatment,
            CaseStatus::PendingApproval => &mut self.pending_approval,
            CaseStatus::Approved => &mut self.approved,
            CaseStatus::Rejected => &mut self.rejected,
            CaseStatus::RevisionRequested => &mut self.revision_requested,
        };
        *slot += count;
    }

    pub fn get(&self, status: CaseStatus) -> u64 {
        match status {
            CaseStatus::PendingTreatment => self.pending_treatment,
            CaseStatus::PendingApproval => self.pending_approval,
            CaseStatus::Approved => self.approved,
            CaseStatus::Rejected => self.rejected,
            CaseStatus::RevisionRequested => self.revision_requested,
        }
    }

    pub fn total(&self) -> u64 {
        CaseStatus::ALL.iter().map(|s| self.get(*s)).sum()
    }
}

/// Number of cases with each raw artifact slot uploaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadCounts {
    pub stl_files: u64,
    pub prescription: u64,
    pub photos: u64,
    /// Cases with all three slots uploaded.
    pub complete: u64,
}

impl FileUploadCounts {
    pub fn add(&mut self, status: &FileUploadStatus) {
        self.stl_files += u64::from(status.stl_files.uploaded);
        self.prescription += u64::from(status.prescription.uploaded);
        self.photos += u64::from(status.photos.uploaded);
        self.complete += u64::from(status.is_complete());
    }
}

/// Statistics response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseStatistics {
    pub total: u64,
    pub by_status: StatusCounts,
    pub file_uploads: FileUploadCounts,
}
