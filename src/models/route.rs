//! Información de ruta devuelta por el proveedor de distancias

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteSource {
    /// Respuesta del proveedor externo (Mapbox)
    Provider,
    /// Estimación geométrica local
    Estimate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteInfo {
    pub distance_meters: i64,
    pub duration_seconds: i64,
    pub distance_text: String,
    pub duration_text: String,
    pub polyline: Option<String>,
    pub source: RouteSource,
}

impl RouteInfo {
    pub fn distance_km(&self) -> Decimal {
        Decimal::new(self.distance_meters.max(0), 3)
    }

    /// Minutos redondeados al más cercano
    pub fn duration_minutes(&self) -> i32 {
        let minutes = (self.duration_seconds.max(0) + 30) / 60;
        i32::try_from(minutes).unwrap_or(i32::MAX)
    }
}
