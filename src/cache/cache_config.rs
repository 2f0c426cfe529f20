//! Configuración de cache
//!
//! Este módulo contiene la configuración para el sistema de cache.

use serde::{Deserialize, Serialize};

/// Configuración del cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub redis_url: String,
    /// TTL del snapshot de zonas activas (segundos)
    pub zones_ttl: u64,
    /// TTL de las rutas del proveedor (segundos)
    pub route_ttl: u64,
}

impl CacheConfig {
    pub fn new(redis_url: impl Into<String>) -> Self {
        Self {
            redis_url: redis_url.into(),
            ..Self::default()
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            zones_ttl: 86400, // 24 horas
            route_ttl: 3600,  // 1 hora
        }
    }
}
