//! Modelo de Service
//!
//! Nivel de servicio / tipo de vehículo con su tarifa base. Mapea a la tabla
//! `services`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Service principal - mapea exactamente a la tabla services
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub base_price: Decimal,
    pub price_per_km: Decimal,
    pub price_per_minute: Decimal,
    pub minimum_distance_km: Decimal,
    pub minimum_duration_minutes: i32,
    pub max_passengers: i32,
    pub max_luggage: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Resumen de servicio que acompaña a cotizaciones y estimaciones
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub max_passengers: i32,
}

impl From<&Service> for ServiceSummary {
    fn from(service: &Service) -> Self {
        Self {
            id: service.id,
            name: service.name.clone(),
            description: service.description.clone(),
            max_passengers: service.max_passengers,
        }
    }
}
