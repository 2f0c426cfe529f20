//! Modelo de Quotation
//!
//! Oferta con precio y vencimiento. Estados: PENDING -> ACCEPTED | EXPIRED.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use super::{pricing::PriceBreakdown, route::RouteInfo};

/// Estado de la cotización - mapea al enum `quotation_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "quotation_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum QuotationStatus {
    Pending,
    Accepted,
    Expired,
}

impl QuotationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, QuotationStatus::Pending)
    }
}

/// Nombres de las zonas de origen y destino
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripZoneNames {
    pub pickup: Option<String>,
    pub dropoff: Option<String>,
}

/// Contenido de la columna JSONB `price_breakdown`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationBreakdown {
    pub pricing: PriceBreakdown,
    pub route: RouteInfo,
    pub zones: TripZoneNames,
}

/// Quotation - mapea a la tabla quotations
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Quotation {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub service_id: Uuid,
    pub pickup_address: String,
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub dropoff_address: String,
    pub dropoff_lat: f64,
    pub dropoff_lng: f64,
    pub distance_km: Decimal,
    pub duration_minutes: i32,
    pub base_price: Decimal,
    pub distance_price: Decimal,
    pub time_price: Decimal,
    pub surge_price: Decimal,
    pub zones_surcharge: Decimal,
    pub discounts: Decimal,
    pub total_price: Decimal,
    pub price_breakdown: Json<QuotationBreakdown>,
    pub requested_date: DateTime<Utc>,
    pub passenger_count: i32,
    pub special_requirements: Option<String>,
    pub status: QuotationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Quotation {
    /// Vencida si `now` es estrictamente posterior a `expires_at`
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn needs_expiry(&self, now: DateTime<Utc>) -> bool {
        self.status == QuotationStatus::Pending && self.is_overdue(now)
    }
}
