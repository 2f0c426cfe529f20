use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::QuotationRepository;
use crate::{models::Quotation, utils::errors::AppResult};

pub struct PgQuotationRepository {
    pool: PgPool,
}

impl PgQuotationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuotationRepository for PgQuotationRepository {
    async fn insert(&self, q: &Quotation) -> AppResult<Quotation> {
        let quotation = sqlx::query_as::<_, Quotation>(
            r#"
            INSERT INTO quotations (
                id, user_id, service_id,
                pickup_address, pickup_lat, pickup_lng,
                dropoff_address, dropoff_lat, dropoff_lng,
                distance_km, duration_minutes,
                base_price, distance_price, time_price, surge_price,
                zones_surcharge, discounts, total_price, price_breakdown,
                requested_date, passenger_count, special_requirements,
                status, created_at, expires_at, accepted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26)
            RETURNING *
            "#,
        )
        .bind(q.id)
        .bind(q.user_id)
        .bind(q.service_id)
        .bind(&q.pickup_address)
        .bind(q.pickup_lat)
        .bind(q.pickup_lng)
        .bind(&q.dropoff_address)
        .bind(q.dropoff_lat)
        .bind(q.dropoff_lng)
        .bind(q.distance_km)
        .bind(q.duration_minutes)
        .bind(q.base_price)
        .bind(q.distance_price)
        .bind(q.time_price)
        .bind(q.surge_price)
        .bind(q.zones_surcharge)
        .bind(q.discounts)
        .bind(q.total_price)
        .bind(&q.price_breakdown)
        .bind(q.requested_date)
        .bind(q.passenger_count)
        .bind(&q.special_requirements)
        .bind(q.status)
        .bind(q.created_at)
        .bind(q.expires_at)
        .bind(q.accepted_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(quotation)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Quotation>> {
        let quotation = sqlx::query_as::<_, Quotation>("SELECT * FROM quotations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(quotation)
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Quotation>, i64)> {
        let quotations = sqlx::query_as::<_, Quotation>(
            r#"
            SELECT * FROM quotations
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotations WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((quotations, total))
    }

    async fn mark_expired(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE quotations SET status = 'EXPIRED'
            WHERE id = $1 AND status = 'PENDING' AND expires_at < $2
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn mark_accepted(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<Option<Quotation>> {
        let quotation = sqlx::query_as::<_, Quotation>(
            r#"
            UPDATE quotations SET status = 'ACCEPTED', accepted_at = $2
            WHERE id = $1 AND status = 'PENDING' AND expires_at >= $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quotation)
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE quotations SET status = 'EXPIRED' WHERE status = 'PENDING' AND expires_at < $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
