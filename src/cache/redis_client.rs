use anyhow::Result;
use redis::{aio::ConnectionManager, AsyncCommands, RedisResult};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::CacheConfig;
use crate::models::GeoPoint;

/// Cliente Redis con connection manager y operaciones async.
///
/// El cache es best-effort: los errores de Redis se registran y se tratan
/// como MISS, nunca se propagan a la request.
#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
    config: CacheConfig,
}

impl RedisClient {
    /// Crear nuevo cliente Redis
    pub async fn new(config: CacheConfig) -> Result<Self> {
        info!("🔗 Conectando a Redis: {}", config.redis_url);

        let client = redis::Client::open(config.redis_url.clone())?;
        let manager = ConnectionManager::new(client).await?;

        let mut conn = manager.clone();
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;

        info!("✅ Redis conectado exitosamente");

        Ok(Self { manager, config })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Generar clave de cache con prefijo
    fn make_key(prefix: &str, identifier: &str) -> String {
        format!("privatelimo:{}:{}", prefix, identifier)
    }

    /// Snapshot de zonas activas
    pub fn zones_key() -> String {
        Self::make_key("zones", "active")
    }

    /// Ruta entre dos puntos; coordenadas redondeadas a 5 decimales (~1 m)
    pub fn route_key(origin: &GeoPoint, destination: &GeoPoint) -> String {
        let raw = format!(
            "{:.5},{:.5};{:.5},{:.5}",
            origin.lat, origin.lng, destination.lat, destination.lng
        );
        Self::make_key("route", &format!("{:x}", md5::compute(raw)))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.manager.clone();

        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(value)) => match serde_json::from_str(&value) {
                Ok(parsed) => {
                    debug!("📥 Cache HIT para clave: {}", key);
                    Some(parsed)
                }
                Err(e) => {
                    warn!("⚠️ Valor corrupto en cache para clave {}: {}", key, e);
                    None
                }
            },
            Ok(None) => {
                debug!("❌ Cache MISS para clave: {}", key);
                None
            }
            Err(e) => {
                warn!("⚠️ Error leyendo cache para clave {}: {}", key, e);
                None
            }
        }
    }

    pub async fn set_json<T: Serialize + Sync>(&self, key: &str, value: &T, ttl: u64) {
        let serialized = match serde_json::to_string(value) {
            Ok(s) => s,
            Err(e) => {
                warn!("⚠️ No se pudo serializar valor para clave {}: {}", key, e);
                return;
            }
        };

        let mut conn = self.manager.clone();
        let result: RedisResult<()> = redis::cmd("SET")
            .arg(key)
            .arg(serialized)
            .arg("EX")
            .arg(ttl)
            .query_async(&mut conn)
            .await;

        match result {
            Ok(()) => debug!("💾 Cache SET para clave: {} (TTL: {}s)", key, ttl),
            Err(e) => warn!("⚠️ Error guardando en cache para clave {}: {}", key, e),
        }
    }

    pub async fn delete(&self, key: &str) {
        let mut conn = self.manager.clone();

        let result: RedisResult<i64> = conn.del(key).await;

        match result {
            Ok(count) => debug!("🗑️ Cache DELETE para clave: {} (eliminados: {})", key, count),
            Err(e) => warn!("⚠️ Error eliminando cache para clave {}: {}", key, e),
        }
    }
}
