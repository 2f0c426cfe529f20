//! Modelo de Zone
//!
//! Área geográfica delimitada por un polígono con su propio recargo.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use super::geo::GeoPoint;

/// Zone - mapea a la tabla zones. El polígono se guarda como JSONB
/// (`[{lat, lng}, ...]`), sin cerrar y sin exigir convexidad.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub polygon: Json<Vec<GeoPoint>>,
    pub surcharge_percentage: Decimal,
    pub surcharge_fixed: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Zone {
    pub fn vertices(&self) -> &[GeoPoint] {
        &self.polygon.0
    }
}

/// Filtros para el listado administrativo de zonas
#[derive(Debug, Clone, Default)]
pub struct ZoneFilters {
    pub is_active: Option<bool>,
    pub search: Option<String>,
}
