//! Growth record repository - dated crop observations

use chrono::{DateTime, Utc};
use farmctl_core::GrowthRecord;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use super::DbError;

/// Validated input for a new growth record
#[derive(Debug, Clone)]
pub struct NewGrowthRecord {
    pub crop_id: Uuid,
    pub stage_id: Option<Uuid>,
    pub recorded_at: DateTime<Utc>,
    pub height_cm: Option<f64>,
    pub health_status: Option<String>,
    pub notes: Option<String>,
    pub image_urls: Vec<String>,
    pub metadata: JsonValue,
    pub created_by: Uuid,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct GrowthRecordPatch {
    pub stage_id: Option<Uuid>,
    pub recorded_at: Option<DateTime<Utc>>,
    pub height_cm: Option<f64>,
    pub health_status: Option<String>,
    pub notes: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub metadata: Option<JsonValue>,
}

/// Growth record repository
pub struct GrowthRecordRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> GrowthRecordRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Records of one crop, newest observation first.
    pub async fn list_for_crop(&self, crop_id: Uuid) -> Result<Vec<GrowthRecord>, DbError> {
        let records = sqlx::query_as::<_, GrowthRecord>(
            "SELECT * FROM growth_records WHERE crop_id = $1 ORDER BY recorded_at DESC",
        )
        .bind(crop_id)
        .fetch_all(self.pool)
        .await?;
        Ok(records)
    }

    /// Most recent records across all crops of a farm.
    pub async fn recent_for_farm(&self, farm_id: Uuid, limit: i64) -> Result<Vec<GrowthRecord>, DbError> {
        let records = sqlx::query_as::<_, GrowthRecord>(
            r#"
            SELECT r.*
            FROM growth_records r
            JOIN crops c ON c.id = r.crop_id
            WHERE c.farm_id = $1
            ORDER BY r.recorded_at DESC
            LIMIT $2
            "#,
        )
        .bind(farm_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(records)
    }

    pub async fn get(&self, id: Uuid) -> Result<GrowthRecord, DbError> {
        sqlx::query_as::<_, GrowthRecord>("SELECT * FROM growth_records WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("growth record", id))
    }

    pub async fn create(&self, input: NewGrowthRecord) -> Result<GrowthRecord, DbError> {
        let record = sqlx::query_as::<_, GrowthRecord>(
            r#"
            INSERT INTO growth_records (
                crop_id, stage_id, recorded_at, height_cm, health_status,
                notes, image_urls, metadata, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(input.crop_id)
        .bind(input.stage_id)
        .bind(input.recorded_at)
        .bind(input.height_cm)
        .bind(&input.health_status)
        .bind(&input.notes)
        .bind(&input.image_urls)
        .bind(&input.metadata)
        .bind(input.created_by)
        .fetch_one(self.pool)
        .await?;

        Ok(record)
    }

    pub async fn update(&self, id: Uuid, patch: GrowthRecordPatch) -> Result<GrowthRecord, DbError> {
        sqlx::query_as::<_, GrowthRecord>(
            r#"
            UPDATE growth_records SET
                stage_id = COALESCE($2, stage_id),
                recorded_at = COALESCE($3, recorded_at),
                height_cm = COALESCE($4, height_cm),
                health_status = COALESCE($5, health_status),
                notes = COALESCE($6, notes),
                image_urls = COALESCE($7, image_urls),
                metadata = COALESCE($8, metadata),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.stage_id)
        .bind(patch.recorded_at)
        .bind(patch.height_cm)
        .bind(&patch.health_status)
        .bind(&patch.notes)
        .bind(&patch.image_urls)
        .bind(&patch.metadata)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("growth record", id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM growth_records WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("growth record", id));
        }
        Ok(())
    }
}
