//! Farm repository

use farmctl_core::Farm;
use sqlx::PgPool;
use uuid::Uuid;

use super::DbError;
use crate::models::EntityName;

/// Validated input for a new farm
#[derive(Debug, Clone)]
pub struct NewFarm {
    pub organization_id: Uuid,
    pub name: EntityName,
    pub location: Option<String>,
    pub total_area: Option<f64>,
    pub description: Option<String>,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct FarmPatch {
    pub name: Option<EntityName>,
    pub location: Option<String>,
    pub total_area: Option<f64>,
    pub description: Option<String>,
}

/// Farm repository
pub struct FarmRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> FarmRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Farms of every organization the user is a member of.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Farm>, DbError> {
        let farms = sqlx::query_as::<_, Farm>(
            r#"
            SELECT f.*
            FROM farms f
            JOIN organization_members m ON m.organization_id = f.organization_id
            WHERE m.user_id = $1
            ORDER BY f.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(farms)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Farm>, DbError> {
        let farm = sqlx::query_as::<_, Farm>("SELECT * FROM farms WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(farm)
    }

    pub async fn get(&self, id: Uuid) -> Result<Farm, DbError> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("farm", id))
    }

    pub async fn create(&self, input: NewFarm) -> Result<Farm, DbError> {
        let farm = sqlx::query_as::<_, Farm>(
            r#"
            INSERT INTO farms (organization_id, name, location, total_area, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(input.organization_id)
        .bind(input.name.as_str())
        .bind(&input.location)
        .bind(input.total_area)
        .bind(&input.description)
        .fetch_one(self.pool)
        .await?;

        Ok(farm)
    }

    pub async fn update(&self, id: Uuid, patch: FarmPatch) -> Result<Farm, DbError> {
        sqlx::query_as::<_, Farm>(
            r#"
            UPDATE farms SET
                name = COALESCE($2, name),
                location = COALESCE($3, location),
                total_area = COALESCE($4, total_area),
                description = COALESCE($5, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name.as_ref().map(EntityName::as_str))
        .bind(&patch.location)
        .bind(patch.total_area)
        .bind(&patch.description)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("farm", id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM farms WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("farm", id));
        }
        Ok(())
    }
}
