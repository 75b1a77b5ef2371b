//! Livestock repository

use farmctl_core::Livestock;
use sqlx::PgPool;
use uuid::Uuid;

use super::DbError;
use crate::models::EntityName;

/// Validated input for a new livestock group
#[derive(Debug, Clone)]
pub struct NewLivestock {
    pub farm_id: Uuid,
    pub name: EntityName,
    pub species: String,
    pub breed: Option<String>,
    pub count: i32,
    pub health_status: String,
    pub average_weight: Option<f64>,
    pub notes: Option<String>,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct LivestockPatch {
    pub name: Option<EntityName>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub count: Option<i32>,
    pub health_status: Option<String>,
    pub average_weight: Option<f64>,
    pub notes: Option<String>,
}

/// Livestock repository
pub struct LivestockRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> LivestockRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_farm(&self, farm_id: Uuid) -> Result<Vec<Livestock>, DbError> {
        let livestock = sqlx::query_as::<_, Livestock>(
            "SELECT * FROM livestock WHERE farm_id = $1 ORDER BY species ASC, name ASC",
        )
        .bind(farm_id)
        .fetch_all(self.pool)
        .await?;
        Ok(livestock)
    }

    pub async fn get(&self, id: Uuid) -> Result<Livestock, DbError> {
        sqlx::query_as::<_, Livestock>("SELECT * FROM livestock WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("livestock", id))
    }

    pub async fn create(&self, input: NewLivestock) -> Result<Livestock, DbError> {
        let livestock = sqlx::query_as::<_, Livestock>(
            r#"
            INSERT INTO livestock (
                farm_id, name, species, breed, count, health_status, average_weight, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(input.farm_id)
        .bind(input.name.as_str())
        .bind(&input.species)
        .bind(&input.breed)
        .bind(input.count)
        .bind(&input.health_status)
        .bind(input.average_weight)
        .bind(&input.notes)
        .fetch_one(self.pool)
        .await?;

        Ok(livestock)
    }

    pub async fn update(&self, id: Uuid, patch: LivestockPatch) -> Result<Livestock, DbError> {
        sqlx::query_as::<_, Livestock>(
            r#"
            UPDATE livestock SET
                name = COALESCE($2, name),
                species = COALESCE($3, species),
                breed = COALESCE($4, breed),
                count = COALESCE($5, count),
                health_status = COALESCE($6, health_status),
                average_weight = COALESCE($7, average_weight),
                notes = COALESCE($8, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name.as_ref().map(EntityName::as_str))
        .bind(&patch.species)
        .bind(&patch.breed)
        .bind(patch.count)
        .bind(&patch.health_status)
        .bind(patch.average_weight)
        .bind(&patch.notes)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("livestock", id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM livestock WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("livestock", id));
        }
        Ok(())
    }
}
