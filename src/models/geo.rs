//! Coordenadas geográficas

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Punto geográfico en grados decimales (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct GeoPoint {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Orden GeoJSON: `[lng, lat]`
    pub fn to_geojson_position(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}
