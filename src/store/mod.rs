//! Case storage.
//!
//! [`CaseStore`] is implemented by the PostgreSQL pool ([`crate::db::DbPool`])
//! and by [`MemoryStore`]. The server picks one at startup from
//! configuration and keeps it for the life of the process.

mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::{Config, StorageBackend};
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{Case, CaseLookup, CaseStatus, FileUploadStatus, ListCasesQuery};

pub use memory::MemoryStore;

/// Persistence operations for case documents.
#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Which backend this is.
    fn backend(&self) -> StorageBackend;

    /// Verify the backend is reachable.
    async fn ping(&self) -> AppResult<()>;

    /// Insert a new case. Fails with `Conflict` when `case_id` is taken.
    async fn insert(&self, case: &Case) -> AppResult<()>;

    async fn find(&self, lookup: &CaseLookup) -> AppResult<Option<Case>>;

    /// Cases matching the filter, newest first.
    async fn list(&self, filter: &ListCasesQuery) -> AppResult<Vec<Case>>;

    /// Replace the stored document with `case` (matched by `id`).
    /// Fails with `NotFound` if it has been deleted meanwhile.
    async fn save(&self, case: &Case) -> AppResult<()>;

    /// Remove a case. Returns false if nothing was deleted.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Case count per status. Statuses with no cases may be omitted.
    async fn count_by_status(&self) -> AppResult<Vec<(CaseStatus, u64)>>;

    /// Raw upload status of every case.
    async fn file_upload_statuses(&self) -> AppResult<Vec<FileUploadStatus>>;
}

/// Open the store selected in `config`.
///
/// A postgres backend that cannot be reached is an error; there is no
/// fallback to memory.
pub async fn open(config: &Config) -> AppResult<Arc<dyn CaseStore>> {
    match config.storage {
        StorageBackend::Postgres => {
            let pool = DbPool::new(&config.database).await?;
            pool.run_migrations().await?;
            Ok(Arc::new(pool))
        }
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Check that the configured backend is reachable without touching the schema.
///
/// Used by `--health-check`, which runs far more often than startup.
pub async fn probe(config: &Config) -> AppResult<()> {
    match config.storage {
        StorageBackend::Postgres => DbPool::new(&config.database).await?.ping().await,
        StorageBackend::Memory => Ok(()),
    }
}

/// Sort newest first; ties broken by case id so the order is stable.
pub(crate) fn sort_newest_first(cases: &mut [Case]) {
    cases.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.case_id.cmp(&a.case_id))
    });
}
