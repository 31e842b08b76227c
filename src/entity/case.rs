//! Case entity for SeaORM.
//!
//! One row per case. Nested sub-records are stored as JSONB documents.

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub case_id: String,
    /// pending_treatment, pending_approval, approved, rejected, revision_requested
    pub status: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub patient: JsonValue,
    pub doctor: String,
    pub notes: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub treatment_plan: Option<JsonValue>,
    #[sea_orm(column_type = "JsonBinary")]
    pub file_upload_status: JsonValue,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
