use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::ServiceRepository;
use crate::{
    models::{FareRuleRow, Service},
    utils::errors::AppResult,
};

pub struct PgServiceRepository {
    pool: PgPool,
}

impl PgServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceRepository for PgServiceRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Service>> {
        let service = sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(service)
    }

    async fn list_active(&self) -> AppResult<Vec<Service>> {
        let services = sqlx::query_as::<_, Service>(
            "SELECT * FROM services WHERE is_active = TRUE ORDER BY name ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(services)
    }

    async fn active_rules_for_service(&self, service_id: Uuid) -> AppResult<Vec<FareRuleRow>> {
        let rules = sqlx::query_as::<_, FareRuleRow>(
            r#"
            SELECT * FROM fare_rules
            WHERE service_id = $1 AND is_active = TRUE
            ORDER BY priority DESC, created_at ASC, id ASC
            "#,
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rules)
    }
}
