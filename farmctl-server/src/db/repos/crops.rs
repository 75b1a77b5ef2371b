//! Crop repository

use chrono::NaiveDate;
use farmctl_core::Crop;
use sqlx::PgPool;
use uuid::Uuid;

use super::DbError;
use crate::models::EntityName;

/// Validated input for a new crop
#[derive(Debug, Clone)]
pub struct NewCrop {
    pub farm_id: Uuid,
    pub name: EntityName,
    pub crop_type: String,
    pub variety: Option<String>,
    pub area: Option<f64>,
    pub status: String,
    pub planting_date: Option<NaiveDate>,
    pub expected_harvest_date: Option<NaiveDate>,
    pub expected_yield: Option<f64>,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct CropPatch {
    pub name: Option<EntityName>,
    pub crop_type: Option<String>,
    pub variety: Option<String>,
    pub area: Option<f64>,
    pub status: Option<String>,
    pub planting_date: Option<NaiveDate>,
    pub expected_harvest_date: Option<NaiveDate>,
    pub expected_yield: Option<f64>,
    pub actual_yield: Option<f64>,
}

/// Crop repository
pub struct CropRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CropRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_farm(&self, farm_id: Uuid) -> Result<Vec<Crop>, DbError> {
        let crops = sqlx::query_as::<_, Crop>(
            "SELECT * FROM crops WHERE farm_id = $1 ORDER BY created_at DESC",
        )
        .bind(farm_id)
        .fetch_all(self.pool)
        .await?;
        Ok(crops)
    }

    pub async fn get(&self, id: Uuid) -> Result<Crop, DbError> {
        sqlx::query_as::<_, Crop>("SELECT * FROM crops WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("crop", id))
    }

    pub async fn create(&self, input: NewCrop) -> Result<Crop, DbError> {
        let crop = sqlx::query_as::<_, Crop>(
            r#"
            INSERT INTO crops (
                farm_id, name, crop_type, variety, area, status,
                planting_date, expected_harvest_date, expected_yield
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(input.farm_id)
        .bind(input.name.as_str())
        .bind(&input.crop_type)
        .bind(&input.variety)
        .bind(input.area)
        .bind(&input.status)
        .bind(input.planting_date)
        .bind(input.expected_harvest_date)
        .bind(input.expected_yield)
        .fetch_one(self.pool)
        .await?;

        Ok(crop)
    }

    pub async fn update(&self, id: Uuid, patch: CropPatch) -> Result<Crop, DbError> {
        sqlx::query_as::<_, Crop>(
            r#"
            UPDATE crops SET
                name = COALESCE($2, name),
                crop_type = COALESCE($3, crop_type),
                variety = COALESCE($4, variety),
                area = COALESCE($5, area),
                status = COALESCE($6, status),
                planting_date = COALESCE($7, planting_date),
                expected_harvest_date = COALESCE($8, expected_harvest_date),
                expected_yield = COALESCE($9, expected_yield),
                actual_yield = COALESCE($10, actual_yield),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name.as_ref().map(EntityName::as_str))
        .bind(&patch.crop_type)
        .bind(&patch.variety)
        .bind(patch.area)
        .bind(&patch.status)
        .bind(patch.planting_date)
        .bind(patch.expected_harvest_date)
        .bind(patch.expected_yield)
        .bind(patch.actual_yield)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("crop", id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM crops WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("crop", id));
        }
        Ok(())
    }
}
