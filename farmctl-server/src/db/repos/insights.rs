//! Insight repository
//!
//! Batches of normalized insights are written in one transaction so a
//! generation run stores all of its rows or none.

use farmctl_core::{Insight, NewInsight};
use sqlx::PgPool;
use uuid::Uuid;

use super::DbError;

/// Insight repository
pub struct InsightRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> InsightRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insights of one farm, newest first.
    pub async fn list_for_farm(&self, farm_id: Uuid) -> Result<Vec<Insight>, DbError> {
        let insights = sqlx::query_as::<_, Insight>(
            "SELECT * FROM insights WHERE farm_id = $1 ORDER BY created_at DESC",
        )
        .bind(farm_id)
        .fetch_all(self.pool)
        .await?;
        Ok(insights)
    }

    pub async fn get(&self, id: Uuid) -> Result<Insight, DbError> {
        sqlx::query_as::<_, Insight>("SELECT * FROM insights WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("insight", id))
    }

    /// Insert a batch, returning the stored rows in input order.
    pub async fn insert_many(&self, batch: &[NewInsight]) -> Result<Vec<Insight>, DbError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(batch.len());

        for insight in batch {
            let row = sqlx::query_as::<_, Insight>(
                r#"
                INSERT INTO insights (
                    farm_id, organization_id, insight_type, title, description,
                    severity, recommended_actions, confidence, metadata,
                    created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                RETURNING *
                "#,
            )
            .bind(insight.farm_id)
            .bind(insight.organization_id)
            .bind(&insight.insight_type)
            .bind(&insight.title)
            .bind(&insight.description)
            .bind(insight.severity.as_str())
            .bind(&insight.recommended_actions)
            .bind(insight.confidence)
            .bind(&insight.metadata)
            .bind(insight.created_at)
            .bind(insight.updated_at)
            .fetch_one(&mut *tx)
            .await?;

            stored.push(row);
        }

        tx.commit().await?;
        Ok(stored)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM insights WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("insight", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn empty_batch_skips_transaction() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool creation failed");

        let stored = InsightRepo::new(&pool).insert_many(&[]).await.expect("insert failed");
        assert!(stored.is_empty());
    }
}
