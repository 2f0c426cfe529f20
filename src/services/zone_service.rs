//! Servicio de zonas
//!
//! Resolución de recargos por zona y administración de zonas. Las zonas
//! activas se recorren en orden de creación y gana la primera que contiene
//! el punto, aunque haya solapamientos.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::types::Json;
use uuid::Uuid;
use validator::Validate;

use super::geo_polygon;
use crate::{
    cache::RedisClient,
    dto::{
        pagination::{self, Paginated, PaginationMeta},
        zone_dto::{CreateZoneRequest, UpdateZoneRequest, ZoneListQuery},
    },
    models::{GeoPoint, Zone, ZoneFilters},
    repositories::ZoneRepository,
    utils::{
        clock::Clock,
        errors::{conflict_error, not_found_error, AppResult},
    },
};

/// Datos públicos de una zona
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub surcharge_percentage: Decimal,
    pub surcharge_fixed: Decimal,
}

impl From<&Zone> for ZoneSummary {
    fn from(zone: &Zone) -> Self {
        Self {
            id: zone.id,
            name: zone.name.clone(),
            slug: zone.slug.clone(),
            surcharge_percentage: zone.surcharge_percentage,
            surcharge_fixed: zone.surcharge_fixed,
        }
    }
}

/// Recargo para un único punto
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointSurcharge {
    pub zone: Option<ZoneSummary>,
    pub percentage: Decimal,
    pub fixed: Decimal,
}

/// Recargo combinado de un viaje: porcentaje por máximo, fijo por suma
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSurcharge {
    pub pickup_zone: Option<ZoneSummary>,
    pub dropoff_zone: Option<ZoneSummary>,
    pub percentage: Decimal,
    pub fixed: Decimal,
}

/// Primera zona (en el orden dado) que contiene el punto
pub fn find_zone<'a>(zones: &'a [Zone], point: &GeoPoint) -> Option<&'a Zone> {
    zones
        .iter()
        .find(|z| z.is_active && geo_polygon::contains(point, z.vertices()))
}

pub fn resolve_in(zones: &[Zone], point: &GeoPoint) -> PointSurcharge {
    match find_zone(zones, point) {
        Some(zone) => PointSurcharge {
            zone: Some(ZoneSummary::from(zone)),
            percentage: zone.surcharge_percentage,
            fixed: zone.surcharge_fixed,
        },
        None => PointSurcharge::default(),
    }
}

pub fn combine(pickup: PointSurcharge, dropoff: PointSurcharge) -> TripSurcharge {
    TripSurcharge {
        percentage: pickup.percentage.max(dropoff.percentage),
        fixed: pickup.fixed + dropoff.fixed,
        pickup_zone: pickup.zone,
        dropoff_zone: dropoff.zone,
    }
}

/// FeatureCollection GeoJSON; coordenadas en orden `[lng, lat]` y anillo cerrado
pub fn to_geojson(zones: &[Zone]) -> Value {
    let features: Vec<Value> = zones
        .iter()
        .map(|zone| {
            let mut ring: Vec<[f64; 2]> = zone
                .vertices()
                .iter()
                .map(GeoPoint::to_geojson_position)
                .collect();
            if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
                if first != last {
                    ring.push(first);
                }
            }
            json!({
                "type": "Feature",
                "properties": {
                    "id": zone.id,
                    "name": zone.name,
                    "slug": zone.slug,
                    "surchargePercentage": zone.surcharge_percentage,
                    "surchargeFixed": zone.surcharge_fixed,
                },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [ring],
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

pub struct ZoneService {
    repo: Arc<dyn ZoneRepository>,
    cache: Option<RedisClient>,
    clock: Arc<dyn Clock>,
}

impl ZoneService {
    pub fn new(
        repo: Arc<dyn ZoneRepository>,
        cache: Option<RedisClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repo, cache, clock }
    }

    /// Zonas activas, desde el cache si está disponible
    pub async fn active_zones(&self) -> AppResult<Vec<Zone>> {
        let key = RedisClient::zones_key();
        if let Some(cache) = &self.cache {
            if let Some(zones) = cache.get_json::<Vec<Zone>>(&key).await {
                return Ok(zones);
            }
        }

        let zones = self.repo.list_active().await?;

        if let Some(cache) = &self.cache {
            cache.set_json(&key, &zones, cache.config().zones_ttl).await;
        }
        Ok(zones)
    }

    async fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            cache.delete(&RedisClient::zones_key()).await;
        }
    }

    pub async fn check_point(&self, point: &GeoPoint) -> AppResult<Option<Zone>> {
        let zones = self.active_zones().await?;
        Ok(find_zone(&zones, point).cloned())
    }

    pub async fn resolve_surcharge(&self, point: &GeoPoint) -> AppResult<PointSurcharge> {
        let zones = self.active_zones().await?;
        Ok(resolve_in(&zones, point))
    }

    pub async fn resolve_for_trip(
        &self,
        pickup: &GeoPoint,
        dropoff: &GeoPoint,
    ) -> AppResult<TripSurcharge> {
        let zones = self.active_zones().await?;
        Ok(combine(resolve_in(&zones, pickup), resolve_in(&zones, dropoff)))
    }

    pub async fn geojson(&self) -> AppResult<Value> {
        let zones = self.active_zones().await?;
        Ok(to_geojson(&zones))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Zone> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Zona", id))
    }

    pub async fn list(&self, query: ZoneListQuery) -> AppResult<Paginated<Zone>> {
        let (page, limit) = pagination::normalize(query.page, query.limit);
        let filters = ZoneFilters {
            is_active: query.is_active,
            search: query.search.filter(|s| !s.trim().is_empty()),
        };
        let (items, total) = self
            .repo
            .search(&filters, i64::from(limit), pagination::offset(page, limit))
            .await?;

        Ok(Paginated {
            items,
            pagination: PaginationMeta::new(page, limit, total),
        })
    }

    pub async fn create(&self, request: CreateZoneRequest) -> AppResult<Zone> {
        request.validate()?;

        if self.repo.find_by_slug(&request.slug).await?.is_some() {
            return Err(conflict_error("Zona", "slug", &request.slug));
        }

        let now = self.clock.now();
        let zone = Zone {
            id: Uuid::new_v4(),
            name: request.name,
            slug: request.slug,
            polygon: Json(request.polygon),
            surcharge_percentage: request.surcharge_percentage.unwrap_or(Decimal::ZERO),
            surcharge_fixed: request.surcharge_fixed.unwrap_or(Decimal::ZERO),
            is_active: request.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        let zone = self.repo.insert(&zone).await?;
        self.invalidate().await;
        log::info!("✅ Zona creada: {} ({})", zone.name, zone.slug);
        Ok(zone)
    }

    pub async fn update(&self, id: Uuid, request: UpdateZoneRequest) -> AppResult<Zone> {
        request.validate()?;
        let mut zone = self.get(id).await?;

        if let Some(slug) = request.slug {
            if slug != zone.slug {
                if self.repo.find_by_slug(&slug).await?.is_some() {
                    return Err(conflict_error("Zona", "slug", &slug));
                }
                zone.slug = slug;
            }
        }
        if let Some(name) = request.name {
            zone.name = name;
        }
        if let Some(polygon) = request.polygon {
            zone.polygon = Json(polygon);
        }
        if let Some(percentage) = request.surcharge_percentage {
            zone.surcharge_percentage = percentage;
        }
        if let Some(fixed) = request.surcharge_fixed {
            zone.surcharge_fixed = fixed;
        }
        if let Some(active) = request.is_active {
            zone.is_active = active;
        }
        zone.updated_at = self.clock.now();

        let zone = self.repo.update(&zone).await?;
        self.invalidate().await;
        log::info!("✅ Zona actualizada: {}", zone.id);
        Ok(zone)
    }

    /// Baja lógica
    pub async fn deactivate(&self, id: Uuid) -> AppResult<Zone> {
        let mut zone = self.get(id).await?;
        zone.is_active = false;
        zone.updated_at = self.clock.now();

        let zone = self.repo.update(&zone).await?;
        self.invalidate().await;
        log::info!("🗑️ Zona desactivada: {}", zone.id);
        Ok(zone)
    }
}
