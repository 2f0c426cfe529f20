//! Cache
//!
//! Cache Redis opcional para el snapshot de zonas y las rutas del proveedor.

pub mod cache_config;
pub mod redis_client;

pub use cache_config::CacheConfig;
pub use redis_client::RedisClient;
