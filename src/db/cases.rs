//! PostgreSQL case store.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::config::StorageBackend;
use crate::entity::case::{self as case_entity, ActiveModel, Entity as CaseEntity};
use crate::error::{AppError, AppResult};
use crate::models::{
    Case, CaseLookup, CaseStatus, FileUploadStatus, ListCasesQuery, Patient, TreatmentPlan,
};
use crate::store::CaseStore;

use super::DbPool;

impl TryFrom<case_entity::Model> for Case {
    type Error = AppError;

    fn try_from(model: case_entity::Model) -> AppResult<Self> {
        let status = CaseStatus::parse(&model.status).ok_or_else(|| {
            AppError::Database(format!(
                "Case {} has unknown status '{}'",
                model.case_id, model.status
            ))
        })?;

        let patient: Patient = decode(&model.case_id, "patient", model.patient)?;
        let treatment_plan: Option<TreatmentPlan> = model
            .treatment_plan
            .map(|plan| decode(&model.case_id, "treatment_plan", plan))
            .transpose()?;
        let file_upload_status: FileUploadStatus =
            decode(&model.case_id, "file_upload_status", model.file_upload_status)?;

        Ok(Case {
            id: model.id,
            case_id: model.case_id,
            status,
            patient,
            doctor: model.doctor,
            notes: model.notes,
            treatment_plan,
            file_upload_status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    case_id: &str,
    column: &str,
    value: JsonValue,
) -> AppResult<T> {
    serde_json::from_value(value).map_err(|e| {
        AppError::Database(format!("Case {} has malformed {}: {}", case_id, column, e))
    })
}

fn encode<T: serde::Serialize>(value: &T) -> AppResult<JsonValue> {
    serde_json::to_value(value)
        .map_err(|e| AppError::Database(format!("Failed to encode case document: {}", e)))
}

/// Build an active model with every column set from `case`.
fn to_active_model(case: &Case) -> AppResult<ActiveModel> {
    Ok(ActiveModel {
        id: Set(case.id),
        case_id: Set(case.case_id.clone()),
        status: Set(case.status.as_str().to_string()),
        patient: Set(encode(&case.patient)?),
        doctor: Set(case.doctor.clone()),
        notes: Set(case.notes.clone()),
        treatment_plan: Set(case.treatment_plan.as_ref().map(encode).transpose()?),
        file_upload_status: Set(encode(&case.file_upload_status)?),
        created_at: Set(case.created_at),
        updated_at: Set(case.updated_at),
    })
}

#[async_trait]
impl CaseStore for DbPool {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Postgres
    }

    async fn ping(&self) -> AppResult<()> {
        self.connection()
            .ping()
            .await
            .map_err(|e| AppError::StorageUnavailable(format!("Database ping failed: {}", e)))
    }

    async fn insert(&self, case: &Case) -> AppResult<()> {
        to_active_model(case)?.insert(self.connection()).await?;
        Ok(())
    }

    async fn find(&self, lookup: &CaseLookup) -> AppResult<Option<Case>> {
        let select = match lookup {
            CaseLookup::Id(id) => CaseEntity::find_by_id(*id),
            CaseLookup::CaseId(case_id) => {
                CaseEntity::find().filter(case_entity::Column::CaseId.eq(case_id.as_str()))
            }
        };

        select
            .one(self.connection())
            .await?
            .map(Case::try_from)
            .transpose()
    }

    async fn list(&self, filter: &ListCasesQuery) -> AppResult<Vec<Case>> {
        let mut select = CaseEntity::find();

        if let Some(status) = filter.status {
            select = select.filter(case_entity::Column::Status.eq(status.as_str()));
        }

        if let Some(ref doctor) = filter.doctor {
            select = select.filter(case_entity::Column::Doctor.eq(doctor.as_str()));
        }

        select
            .order_by_desc(case_entity::Column::CreatedAt)
            .order_by_desc(case_entity::Column::CaseId)
            .all(self.connection())
            .await?
            .into_iter()
            .map(Case::try_from)
            .collect()
    }

    async fn save(&self, case: &Case) -> AppResult<()> {
        let mut active = to_active_model(case)?;
        active.id = Unchanged(case.id);

        match active.update(self.connection()).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => {
                Err(AppError::NotFound(format!("Case {}", case.case_id)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = CaseEntity::delete_by_id(id).exec(self.connection()).await?;
        Ok(result.rows_affected > 0)
    }

    async fn count_by_status(&self) -> AppResult<Vec<(CaseStatus, u64)>> {
        let rows: Vec<(String, i64)> = CaseEntity::find()
            .select_only()
            .column(case_entity::Column::Status)
            .column_as(Expr::from(Func::count(Expr::col(case_entity::Column::Id))), "count")
            .group_by(case_entity::Column::Status)
            .into_tuple()
            .all(self.connection())
            .await?;

        rows.into_iter()
            .map(|(status, count)| {
                let parsed = CaseStatus::parse(&status).ok_or_else(|| {
                    AppError::Database(format!("Unknown case status '{}'", status))
                })?;
                Ok((parsed, count.max(0) as u64))
            })
            .collect()
    }

    async fn file_upload_statuses(&self) -> AppResult<Vec<FileUploadStatus>> {
        let rows: Vec<(String, JsonValue)> = CaseEntity::find()
            .select_only()
            .column(case_entity::Column::CaseId)
            .column(case_entity::Column::FileUploadStatus)
            .into_tuple()
            .all(self.connection())
            .await?;

        rows.into_iter()
            .map(|(case_id, value)| decode(&case_id, "file_upload_status", value))
            .collect()
    }
}
