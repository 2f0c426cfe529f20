//! Repositorios
//!
//! Acceso a datos detrás de traits asíncronos. Cada trait tiene una
//! implementación PostgreSQL (`Pg*`) y una en memoria (`memory`) usada por
//! los tests y por el modo de desarrollo sin base de datos.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    models::{FareRuleRow, Quotation, Service, Zone, ZoneFilters},
    utils::errors::AppResult,
};

pub mod memory;
pub mod quotation_repository;
pub mod service_repository;
pub mod zone_repository;

pub use memory::{InMemoryQuotationRepository, InMemoryServiceRepository, InMemoryZoneRepository};
pub use quotation_repository::PgQuotationRepository;
pub use service_repository::PgServiceRepository;
pub use zone_repository::PgZoneRepository;

/// Catálogo de servicios y sus reglas tarifarias
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Service>>;

    /// Servicios activos ordenados por nombre
    async fn list_active(&self) -> AppResult<Vec<Service>>;

    /// Reglas activas del servicio, sin filtrar por vigencia
    async fn active_rules_for_service(&self, service_id: Uuid) -> AppResult<Vec<FareRuleRow>>;
}

#[async_trait]
pub trait ZoneRepository: Send + Sync {
    /// Zonas activas en orden de creación
    async fn list_active(&self) -> AppResult<Vec<Zone>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Zone>>;

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Zone>>;

    /// Devuelve `Conflict` si el slug ya existe
    async fn insert(&self, zone: &Zone) -> AppResult<Zone>;

    /// Reemplaza el registro completo. `Conflict` si el slug ya existe en otra zona.
    async fn update(&self, zone: &Zone) -> AppResult<Zone>;

    async fn search(
        &self,
        filters: &ZoneFilters,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Zone>, i64)>;
}

#[async_trait]
pub trait QuotationRepository: Send + Sync {
    async fn insert(&self, quotation: &Quotation) -> AppResult<Quotation>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Quotation>>;

    /// Cotizaciones del usuario, más recientes primero, con el total
    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Quotation>, i64)>;

    /// PENDING -> EXPIRED solo si sigue PENDING y `expires_at < now`.
    /// Devuelve `true` si esta llamada hizo la transición.
    async fn mark_expired(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool>;

    /// PENDING -> ACCEPTED solo si sigue PENDING y no venció.
    /// `None` si otra operación ganó la carrera.
    async fn mark_accepted(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<Option<Quotation>>;

    /// Expira en bloque todas las PENDING vencidas
    async fn expire_overdue(&self, now: DateTime<Utc>) -> AppResult<u64>;
}
