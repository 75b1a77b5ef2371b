//! Insight generation
//!
//! Flow for a farm (livestock is the same with a narrower prompt):
//! 1. Look up the farm (missing -> NotFound, nothing else happens)
//! 2. Check the caller's organization membership (-> Forbidden)
//! 3. Gather a snapshot and build the prompt
//! 4. Call the AI provider and extract candidate objects
//! 5. Normalize every candidate and insert the batch

use async_trait::async_trait;
use chrono::Utc;
use farmctl_core::{
    build_farm_prompt, build_livestock_prompt, extract_candidates, normalize_insight, CoreError,
    Farm, FarmSnapshot, Insight, InsightContext, Livestock, NewInsight, Prompt,
};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::clients::{AiError, AuthUser, InsightGenerator};
use crate::db::{
    CropRepo, DbError, FarmRepo, GrowthRecordRepo, InsightRepo, LivestockRepo, MemberRepo,
};

/// Growth checkpoints pulled into a farm snapshot
const SNAPSHOT_GROWTH_LIMIT: i64 = 20;

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: Uuid },

    #[error("not a member of the farm's organization")]
    Forbidden,

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error("could not read model output: {0}")]
    Parse(#[from] CoreError),
}

/// Read/write access the generator needs
#[async_trait]
pub trait InsightStore: Send + Sync {
    async fn farm(&self, farm_id: Uuid) -> Result<Option<Farm>, DbError>;
    async fn livestock(&self, livestock_id: Uuid) -> Result<Option<Livestock>, DbError>;
    async fn is_member(&self, organization_id: Uuid, user_id: Uuid) -> Result<bool, DbError>;
    async fn snapshot(&self, farm: Farm) -> Result<FarmSnapshot, DbError>;
    async fn insert(&self, batch: &[NewInsight]) -> Result<Vec<Insight>, DbError>;
}

/// Postgres-backed store built on the repositories
#[derive(Clone)]
pub struct PgInsightStore {
    pool: PgPool,
}

impl PgInsightStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InsightStore for PgInsightStore {
    async fn farm(&self, farm_id: Uuid) -> Result<Option<Farm>, DbError> {
        FarmRepo::new(&self.pool).find(farm_id).await
    }

    async fn livestock(&self, livestock_id: Uuid) -> Result<Option<Livestock>, DbError> {
        match LivestockRepo::new(&self.pool).get(livestock_id).await {
            Ok(livestock) => Ok(Some(livestock)),
            Err(DbError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn is_member(&self, organization_id: Uuid, user_id: Uuid) -> Result<bool, DbError> {
        MemberRepo::new(&self.pool).is_member(organization_id, user_id).await
    }

    async fn snapshot(&self, farm: Farm) -> Result<FarmSnapshot, DbError> {
        let crops = CropRepo::new(&self.pool).list_for_farm(farm.id).await?;
        let livestock = LivestockRepo::new(&self.pool).list_for_farm(farm.id).await?;
        let recent_growth = GrowthRecordRepo::new(&self.pool)
            .recent_for_farm(farm.id, SNAPSHOT_GROWTH_LIMIT)
            .await?;

        Ok(FarmSnapshot {
            farm,
            crops,
            livestock,
            recent_growth,
        })
    }

    async fn insert(&self, batch: &[NewInsight]) -> Result<Vec<Insight>, DbError> {
        InsightRepo::new(&self.pool).insert_many(batch).await
    }
}

/// A generated batch that has not been stored yet
#[derive(Debug, Clone)]
pub struct Draft {
    pub prompt: Prompt,
    pub insights: Vec<NewInsight>,
}

/// Ties a store and an AI provider together
pub struct InsightService<'a> {
    store: &'a dyn InsightStore,
    ai: &'a dyn InsightGenerator,
}

impl<'a> InsightService<'a> {
    pub fn new(store: &'a dyn InsightStore, ai: &'a dyn InsightGenerator) -> Self {
        Self { store, ai }
    }

    /// Look up a farm and, when a user is given, check membership.
    pub async fn authorized_farm(
        &self,
        farm_id: Uuid,
        user: Option<&AuthUser>,
    ) -> Result<Farm, InsightError> {
        let farm = self
            .store
            .farm(farm_id)
            .await?
            .ok_or(InsightError::NotFound {
                resource: "farm",
                id: farm_id,
            })?;

        if let Some(user) = user {
            if !self.store.is_member(farm.organization_id, user.id).await? {
                tracing::warn!(farm_id = %farm.id, user_id = %user.id, "Insight request denied");
                return Err(InsightError::Forbidden);
            }
        }
        Ok(farm)
    }

    /// Build the prompt, call the model and normalize, without storing.
    pub async fn draft_farm_insights(&self, farm: Farm) -> Result<Draft, InsightError> {
        let ctx = InsightContext::new(farm.id, farm.organization_id)
            .with_metadata("source", "farm")
            .with_metadata("model", self.ai.model());
        let snapshot = self.store.snapshot(farm).await?;
        let prompt = build_farm_prompt(&snapshot);
        self.draft(prompt, &ctx).await
    }

    /// Generate and store insights for a farm.
    pub async fn generate_farm_insights(
        &self,
        farm_id: Uuid,
        user: &AuthUser,
    ) -> Result<Vec<Insight>, InsightError> {
        let farm = self.authorized_farm(farm_id, Some(user)).await?;
        let draft = self.draft_farm_insights(farm).await?;
        self.store_draft(draft).await
    }

    /// Generate and store insights for one livestock group.
    pub async fn generate_livestock_insights(
        &self,
        livestock_id: Uuid,
        user: &AuthUser,
    ) -> Result<Vec<Insight>, InsightError> {
        let livestock = self
            .store
            .livestock(livestock_id)
            .await?
            .ok_or(InsightError::NotFound {
                resource: "livestock",
                id: livestock_id,
            })?;
        let farm = self.authorized_farm(livestock.farm_id, Some(user)).await?;

        let ctx = InsightContext::new(farm.id, farm.organization_id)
            .with_metadata("source", "livestock")
            .with_metadata("model", self.ai.model())
            .with_metadata("livestock_id", livestock.id.to_string());
        let prompt = build_livestock_prompt(&farm, &livestock);
        let draft = self.draft(prompt, &ctx).await?;
        self.store_draft(draft).await
    }

    async fn draft(&self, prompt: Prompt, ctx: &InsightContext) -> Result<Draft, InsightError> {
        let content = self.ai.complete(&prompt).await?;
        let candidates = extract_candidates(&content)?;

        let now = Utc::now();
        let insights: Vec<NewInsight> = candidates
            .iter()
            .map(|raw| normalize_insight(raw, ctx, now))
            .collect();

        tracing::info!(
            farm_id = %ctx.farm_id,
            count = insights.len(),
            "Normalized generated insights"
        );
        Ok(Draft { prompt, insights })
    }

    /// Persist a draft's insights.
    pub async fn store_draft(&self, draft: Draft) -> Result<Vec<Insight>, InsightError> {
        Ok(self.store.insert(&draft.insights).await?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use chrono::{TimeZone, Utc};
    use farmctl_core::Severity;

    /// In-memory store that records writes
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub farms: Vec<Farm>,
        pub livestock: Vec<Livestock>,
        pub members: Vec<(Uuid, Uuid)>,
        pub inserted: Mutex<Vec<NewInsight>>,
    }

    #[async_trait]
    impl InsightStore for MemoryStore {
        async fn farm(&self, farm_id: Uuid) -> Result<Option<Farm>, DbError> {
            Ok(self.farms.iter().find(|f| f.id == farm_id).cloned())
        }

        async fn livestock(&self, livestock_id: Uuid) -> Result<Option<Livestock>, DbError> {
            Ok(self.livestock.iter().find(|l| l.id == livestock_id).cloned())
        }

        async fn is_member(&self, organization_id: Uuid, user_id: Uuid) -> Result<bool, DbError> {
            Ok(self.members.contains(&(organization_id, user_id)))
        }

        async fn snapshot(&self, farm: Farm) -> Result<FarmSnapshot, DbError> {
            let livestock = self
                .livestock
                .iter()
                .filter(|l| l.farm_id == farm.id)
                .cloned()
                .collect();
            Ok(FarmSnapshot {
                farm,
                crops: vec![],
                livestock,
                recent_growth: vec![],
            })
        }

        async fn insert(&self, batch: &[NewInsight]) -> Result<Vec<Insight>, DbError> {
            self.inserted.lock().unwrap().extend_from_slice(batch);
            Ok(batch
                .iter()
                .map(|n| Insight {
                    id: Uuid::new_v4(),
                    farm_id: n.farm_id,
                    organization_id: n.organization_id,
                    insight_type: n.insight_type.clone(),
                    title: n.title.clone(),
                    description: n.description.clone(),
                    severity: n.severity.as_str().to_string(),
                    recommended_actions: n.recommended_actions.clone(),
                    confidence: n.confidence,
                    metadata: n.metadata.clone(),
                    created_at: n.created_at,
                    updated_at: n.updated_at,
                })
                .collect())
        }
    }

    /// Generator that replays a canned reply and counts calls
    pub(crate) struct CannedGenerator {
        pub reply: String,
        pub calls: AtomicUsize,
    }

    impl CannedGenerator {
        pub fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl InsightGenerator for CannedGenerator {
        async fn complete(&self, _prompt: &Prompt) -> Result<String, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }

        fn model(&self) -> &str {
            "canned"
        }
    }

    pub(crate) fn farm(id: Uuid, org: Uuid) -> Farm {
        let ts = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
        Farm {
            id,
            organization_id: org,
            name: "Test farm".into(),
            location: None,
            total_area: Some(12.0),
            description: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn herd(id: Uuid, farm_id: Uuid) -> Livestock {
        let ts = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
        Livestock {
            id,
            farm_id,
            name: "Layers".into(),
            species: "Chicken".into(),
            breed: None,
            count: 200,
            health_status: "healthy".into(),
            average_weight: Some(1.8),
            notes: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn user() -> AuthUser {
        AuthUser {
            id: Uuid::from_u128(100),
            email: None,
        }
    }

    const REPLY: &str = r#"{"insights": [
        {"title": "Rotate paddocks", "severity": "LOW", "confidence": 3, "recommended_actions": ["Move herd"]},
        {"severity": "severe", "confidence": "high", "recommended_actions": "none"}
    ]}"#;

    #[tokio::test]
    async fn missing_farm_is_not_found_and_writes_nothing() {
        let store = MemoryStore::default();
        let ai = CannedGenerator::new(REPLY);
        let service = InsightService::new(&store, &ai);

        let err = service
            .generate_farm_insights(Uuid::new_v4(), &user())
            .await
            .unwrap_err();

        assert!(matches!(err, InsightError::NotFound { resource: "farm", .. }));
        assert!(store.inserted.lock().unwrap().is_empty());
        assert_eq!(ai.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_member_is_forbidden() {
        let farm_id = Uuid::new_v4();
        let store = MemoryStore {
            farms: vec![farm(farm_id, Uuid::from_u128(1))],
            ..Default::default()
        };
        let ai = CannedGenerator::new(REPLY);
        let service = InsightService::new(&store, &ai);

        let err = service.generate_farm_insights(farm_id, &user()).await.unwrap_err();
        assert!(matches!(err, InsightError::Forbidden));
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn generates_and_stores_normalized_rows() {
        let farm_id = Uuid::new_v4();
        let org = Uuid::from_u128(1);
        let store = MemoryStore {
            farms: vec![farm(farm_id, org)],
            members: vec![(org, user().id)],
            ..Default::default()
        };
        let ai = CannedGenerator::new(REPLY);
        let service = InsightService::new(&store, &ai);

        let stored = service.generate_farm_insights(farm_id, &user()).await.unwrap();
        assert_eq!(stored.len(), 2);

        let inserted = store.inserted.lock().unwrap();
        assert_eq!(inserted[0].title, "Rotate paddocks");
        assert_eq!(inserted[0].severity, Severity::Low);
        assert_eq!(inserted[0].confidence, 1.0);
        assert_eq!(inserted[1].title, "New Insight");
        assert_eq!(inserted[1].severity, Severity::Medium);
        assert_eq!(inserted[1].confidence, 0.7);
        assert!(inserted[1].recommended_actions.is_empty());
        assert!(inserted.iter().all(|i| i.organization_id == org));
        assert_eq!(inserted[0].metadata["model"], "canned");
    }

    #[tokio::test]
    async fn unreadable_model_output_stores_nothing() {
        let farm_id = Uuid::new_v4();
        let org = Uuid::from_u128(1);
        let store = MemoryStore {
            farms: vec![farm(farm_id, org)],
            members: vec![(org, user().id)],
            ..Default::default()
        };
        let ai = CannedGenerator::new("Sorry, I can't help with that.");
        let service = InsightService::new(&store, &ai);

        let err = service.generate_farm_insights(farm_id, &user()).await.unwrap_err();
        assert!(matches!(err, InsightError::Parse(_)));
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn livestock_insights_carry_livestock_id() {
        let farm_id = Uuid::new_v4();
        let herd_id = Uuid::new_v4();
        let org = Uuid::from_u128(1);
        let store = MemoryStore {
            farms: vec![farm(farm_id, org)],
            livestock: vec![herd(herd_id, farm_id)],
            members: vec![(org, user().id)],
            ..Default::default()
        };
        let ai = CannedGenerator::new(r#"[{"title": "Check water lines"}]"#);
        let service = InsightService::new(&store, &ai);

        let stored = service
            .generate_livestock_insights(herd_id, &user())
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].metadata["livestock_id"], herd_id.to_string());
        assert_eq!(stored[0].farm_id, farm_id);
    }

    #[tokio::test]
    async fn missing_livestock_is_not_found() {
        let store = MemoryStore::default();
        let ai = CannedGenerator::new(REPLY);
        let service = InsightService::new(&store, &ai);

        let err = service
            .generate_livestock_insights(Uuid::new_v4(), &user())
            .await
            .unwrap_err();
        assert!(matches!(err, InsightError::NotFound { resource: "livestock", .. }));
        assert_eq!(ai.calls.load(Ordering::SeqCst), 0);
    }
}
