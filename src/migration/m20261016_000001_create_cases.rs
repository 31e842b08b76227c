//! Migration: Create cases table.
//!
//! Cases are treatment records moving through plan review.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE cases (
                    id UUID PRIMARY KEY,
                    case_id VARCHAR(64) NOT NULL,
                    status VARCHAR(32) NOT NULL DEFAULT 'pending_treatment'
                        CHECK (status IN ('pending_treatment', 'pending_approval', 'approved',
                                          'rejected', 'revision_requested')),

                    -- {name, ...free-form patient attributes}
                    patient JSONB NOT NULL,
                    doctor VARCHAR(255) NOT NULL,
                    notes TEXT,

                    -- Set once an admin has uploaded a plan
                    treatment_plan JSONB,

                    -- {stlFiles, prescription, photos}
                    file_upload_status JSONB NOT NULL DEFAULT '{}'::jsonb,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE UNIQUE INDEX idx_cases_case_id ON cases(case_id);

                CREATE INDEX idx_cases_status ON cases(status);

                CREATE INDEX idx_cases_doctor ON cases(doctor);

                CREATE INDEX idx_cases_created_at ON cases(created_at DESC);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS cases;")
            .await?;

        Ok(())
    }
}
