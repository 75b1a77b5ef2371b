//! Organization membership - the tenant boundary for access checks

use sqlx::PgPool;
use uuid::Uuid;

use super::DbError;

/// Membership repository
pub struct MemberRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> MemberRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Whether `user_id` belongs to `organization_id`.
    pub async fn is_member(&self, organization_id: Uuid, user_id: Uuid) -> Result<bool, DbError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM organization_members
                WHERE organization_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn stranger_is_not_member() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool creation failed");

        let member = MemberRepo::new(&pool)
            .is_member(Uuid::new_v4(), Uuid::new_v4())
            .await
            .expect("query failed");
        assert!(!member);
    }
}
