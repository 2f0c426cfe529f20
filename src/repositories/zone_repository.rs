use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::ZoneRepository;
use crate::{
    models::{Zone, ZoneFilters},
    utils::errors::{conflict_error, map_unique_violation, AppResult},
};

pub struct PgZoneRepository {
    pool: PgPool,
}

impl PgZoneRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ZoneRepository for PgZoneRepository {
    async fn list_active(&self) -> AppResult<Vec<Zone>> {
        let zones = sqlx::query_as::<_, Zone>(
            "SELECT * FROM zones WHERE is_active = TRUE ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(zones)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Zone>> {
        let zone = sqlx::query_as::<_, Zone>("SELECT * FROM zones WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(zone)
    }

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Zone>> {
        let zone = sqlx::query_as::<_, Zone>("SELECT * FROM zones WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(zone)
    }

    async fn insert(&self, zone: &Zone) -> AppResult<Zone> {
        sqlx::query_as::<_, Zone>(
            r#"
            INSERT INTO zones (id, name, slug, polygon, surcharge_percentage, surcharge_fixed,
                               is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(zone.id)
        .bind(&zone.name)
        .bind(&zone.slug)
        .bind(&zone.polygon)
        .bind(zone.surcharge_percentage)
        .bind(zone.surcharge_fixed)
        .bind(zone.is_active)
        .bind(zone.created_at)
        .bind(zone.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || conflict_error("Zona", "slug", &zone.slug)))
    }

    async fn update(&self, zone: &Zone) -> AppResult<Zone> {
        sqlx::query_as::<_, Zone>(
            r#"
            UPDATE zones
            SET name = $2, slug = $3, polygon = $4, surcharge_percentage = $5,
                surcharge_fixed = $6, is_active = $7, updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(zone.id)
        .bind(&zone.name)
        .bind(&zone.slug)
        .bind(&zone.polygon)
        .bind(zone.surcharge_percentage)
        .bind(zone.surcharge_fixed)
        .bind(zone.is_active)
        .bind(zone.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || conflict_error("Zona", "slug", &zone.slug)))
    }

    async fn search(
        &self,
        filters: &ZoneFilters,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Zone>, i64)> {
        let pattern = filters.search.as_ref().map(|s| format!("%{}%", s));

        let zones = sqlx::query_as::<_, Zone>(
            r#"
            SELECT * FROM zones
            WHERE ($1::BOOLEAN IS NULL OR is_active = $1)
              AND ($2::TEXT IS NULL OR name ILIKE $2 OR slug ILIKE $2)
            ORDER BY name ASC, id ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filters.is_active)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM zones
            WHERE ($1::BOOLEAN IS NULL OR is_active = $1)
              AND ($2::TEXT IS NULL OR name ILIKE $2 OR slug ILIKE $2)
            "#,
        )
        .bind(filters.is_active)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((zones, total))
    }
}
