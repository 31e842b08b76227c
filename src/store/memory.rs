//! In-memory case store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CaseStore, sort_newest_first};
use crate::config::StorageBackend;
use crate::error::{AppError, AppResult};
use crate::models::{Case, CaseLookup, CaseStatus, FileUploadStatus, ListCasesQuery};

/// Case store backed by a `HashMap`. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    cases: RwLock<HashMap<Uuid, Case>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CaseStore for MemoryStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Memory
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn insert(&self, case: &Case) -> AppResult<()> {
        let mut cases = self.cases.write().await;
        if cases.values().any(|c| c.case_id == case.case_id) {
            return Err(AppError::Conflict(format!(
                "Case id {} already exists",
                case.case_id
            )));
        }
        if cases.contains_key(&case.id) {
            return Err(AppError::Conflict(format!("Case {} already exists", case.id)));
        }
        cases.insert(case.id, case.clone());
        Ok(())
    }

    async fn find(&self, lookup: &CaseLookup) -> AppResult<Option<Case>> {
        let cases = self.cases.read().await;
        let found = match lookup {
            CaseLookup::Id(id) => cases.get(id).cloned(),
            CaseLookup::CaseId(_) => cases.values().find(|c| lookup.matches(c)).cloned(),
        };
        Ok(found)
    }

    async fn list(&self, filter: &ListCasesQuery) -> AppResult<Vec<Case>> {
        let cases = self.cases.read().await;
        let mut matching: Vec<Case> = cases
            .values()
            .filter(|c| filter.status.is_none_or(|s| c.status == s))
            .filter(|c| filter.doctor.as_ref().is_none_or(|d| &c.doctor == d))
            .cloned()
            .collect();
        sort_newest_first(&mut matching);
        Ok(matching)
    }

    async fn save(&self, case: &Case) -> AppResult<()> {
        let mut cases = self.cases.write().await;
        match cases.get_mut(&case.id) {
            Some(stored) => {
                *stored = case.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Case {}", case.case_id))),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.cases.write().await.remove(&id).is_some())
    }

    async fn count_by_status(&self) -> AppResult<Vec<(CaseStatus, u64)>> {
        let cases = self.cases.read().await;
        let mut counts: HashMap<CaseStatus, u64> = HashMap::new();
        for case in cases.values() {
            *counts.entry(case.status).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn file_upload_statuses(&self) -> AppResult<Vec<FileUploadStatus>> {
        let cases = self.cases.read().await;
        Ok(cases
            .values()
            .map(|c| c.file_upload_status.clone())
            .collect())
    }
}
