//! Growth stage repository - named lifecycle phases per crop

use chrono::{DateTime, Utc};
use farmctl_core::GrowthStage;
use sqlx::PgPool;
use uuid::Uuid;

use super::DbError;
use crate::models::EntityName;

/// Validated input for a new growth stage
#[derive(Debug, Clone)]
pub struct NewGrowthStage {
    pub crop_id: Uuid,
    pub name: EntityName,
    pub stage_order: i32,
    pub description: Option<String>,
    pub expected_duration_days: Option<i32>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct GrowthStagePatch {
    pub name: Option<EntityName>,
    pub stage_order: Option<i32>,
    pub description: Option<String>,
    pub expected_duration_days: Option<i32>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Growth stage repository
pub struct GrowthStageRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> GrowthStageRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Stages of one crop in lifecycle order.
    pub async fn list_for_crop(&self, crop_id: Uuid) -> Result<Vec<GrowthStage>, DbError> {
        let stages = sqlx::query_as::<_, GrowthStage>(
            "SELECT * FROM growth_stages WHERE crop_id = $1 ORDER BY stage_order ASC, created_at ASC",
        )
        .bind(crop_id)
        .fetch_all(self.pool)
        .await?;
        Ok(stages)
    }

    pub async fn get(&self, id: Uuid) -> Result<GrowthStage, DbError> {
        sqlx::query_as::<_, GrowthStage>("SELECT * FROM growth_stages WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("growth stage", id))
    }

    pub async fn create(&self, input: NewGrowthStage) -> Result<GrowthStage, DbError> {
        let stage = sqlx::query_as::<_, GrowthStage>(
            r#"
            INSERT INTO growth_stages (
                crop_id, name, stage_order, description,
                expected_duration_days, started_at, completed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(input.crop_id)
        .bind(input.name.as_str())
        .bind(input.stage_order)
        .bind(&input.description)
        .bind(input.expected_duration_days)
        .bind(input.started_at)
        .bind(input.completed_at)
        .fetch_one(self.pool)
        .await?;

        Ok(stage)
    }

    pub async fn update(&self, id: Uuid, patch: GrowthStagePatch) -> Result<GrowthStage, DbError> {
        sqlx::query_as::<_, GrowthStage>(
            r#"
            UPDATE growth_stages SET
                name = COALESCE($2, name),
                stage_order = COALESCE($3, stage_order),
                description = COALESCE($4, description),
                expected_duration_days = COALESCE($5, expected_duration_days),
                started_at = COALESCE($6, started_at),
                completed_at = COALESCE($7, completed_at),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name.as_ref().map(EntityName::as_str))
        .bind(patch.stage_order)
        .bind(&patch.description)
        .bind(patch.expected_duration_days)
        .bind(patch.started_at)
        .bind(patch.completed_at)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("growth stage", id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM growth_stages WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("growth stage", id));
        }
        Ok(())
    }
}
