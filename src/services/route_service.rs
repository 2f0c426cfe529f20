//! Distancia y duración de rutas
//!
//! El proveedor externo (Mapbox Directions) se consulta con un timeout; si
//! falla o tarda demasiado se usa una estimación geométrica local, por lo que
//! `RouteService::calculate_route` nunca falla.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use super::geo_polygon::haversine_km;
use crate::{
    cache::RedisClient,
    models::{GeoPoint, RouteInfo, RouteSource},
    utils::format::{distance_text, duration_text},
};

/// Factor empírico distancia por calle / distancia en línea recta
pub const ROAD_DISTANCE_FACTOR: f64 = 1.4;
/// Velocidad urbana promedio asumida (km/h)
pub const AVERAGE_SPEED_KMH: f64 = 40.0;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("route provider returned status {0}")]
    Status(u16),

    #[error("route provider returned no routes")]
    NoRoute,

    #[error("route provider timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn route(
        &self,
        origin: &GeoPoint,
        destination: &GeoPoint,
    ) -> Result<RouteInfo, RouteError>;
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    distance: f64, // metros
    duration: f64, // segundos
    geometry: Option<String>,
}

/// Proveedor Mapbox Directions (perfil `driving`, geometría polyline)
pub struct MapboxDirectionsProvider {
    access_token: String,
    client: reqwest::Client,
    base_url: String,
}

impl MapboxDirectionsProvider {
    pub fn new(access_token: String) -> Result<Self, RouteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            access_token,
            client,
            base_url: "https://api.mapbox.com/directions/v5/mapbox/driving".to_string(),
        })
    }

    fn url(&self, origin: &GeoPoint, destination: &GeoPoint) -> String {
        format!(
            "{}/{},{};{},{}?access_token={}&geometries=polyline&overview=simplified",
            self.base_url,
            origin.lng,
            origin.lat,
            destination.lng,
            destination.lat,
            urlencoding::encode(&self.access_token)
        )
    }
}

#[async_trait]
impl RouteProvider for MapboxDirectionsProvider {
    async fn route(
        &self,
        origin: &GeoPoint,
        destination: &GeoPoint,
    ) -> Result<RouteInfo, RouteError> {
        log::debug!(
            "🗺️ Consultando Mapbox Directions: ({}, {}) -> ({}, {})",
            origin.lat,
            origin.lng,
            destination.lat,
            destination.lng
        );

        let response = self
            .client
            .get(self.url(origin, destination))
            .header("User-Agent", "PrivateLimo/1.0")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RouteError::Status(status.as_u16()));
        }

        let body: DirectionsResponse = response.json().await?;
        let route = body.routes.into_iter().next().ok_or(RouteError::NoRoute)?;

        let meters = route.distance.round() as i64;
        let seconds = route.duration.round() as i64;
        Ok(RouteInfo {
            distance_meters: meters,
            duration_seconds: seconds,
            distance_text: distance_text(meters),
            duration_text: duration_text(seconds),
            polyline: route.geometry,
            source: RouteSource::Provider,
        })
    }
}

/// Estimación local: haversine x factor de calle, a velocidad urbana promedio
pub fn estimate_route(origin: &GeoPoint, destination: &GeoPoint) -> RouteInfo {
    let km = haversine_km(origin, destination) * ROAD_DISTANCE_FACTOR;
    let meters = (km * 1000.0).round() as i64;
    let seconds = (km / AVERAGE_SPEED_KMH * 3600.0).round() as i64;

    RouteInfo {
        distance_meters: meters,
        duration_seconds: seconds,
        distance_text: distance_text(meters),
        duration_text: duration_text(seconds),
        polyline: None,
        source: RouteSource::Estimate,
    }
}

pub struct RouteService {
    provider: Option<Arc<dyn RouteProvider>>,
    timeout: Duration,
    cache: Option<RedisClient>,
}

impl RouteService {
    pub fn new(
        provider: Option<Arc<dyn RouteProvider>>,
        timeout: Duration,
        cache: Option<RedisClient>,
    ) -> Self {
        Self {
            provider,
            timeout,
            cache,
        }
    }

    async fn query_provider(
        &self,
        provider: &dyn RouteProvider,
        origin: &GeoPoint,
        destination: &GeoPoint,
    ) -> Result<RouteInfo, RouteError> {
        match tokio::time::timeout(self.timeout, provider.route(origin, destination)).await {
            Ok(result) => result,
            Err(_) => Err(RouteError::Timeout(self.timeout)),
        }
    }

    pub async fn calculate_route(&self, origin: &GeoPoint, destination: &GeoPoint) -> RouteInfo {
        let Some(provider) = &self.provider else {
            return estimate_route(origin, destination);
        };

        let key = RedisClient::route_key(origin, destination);
        if let Some(cache) = &self.cache {
            if let Some(route) = cache.get_json::<RouteInfo>(&key).await {
                return route;
            }
        }

        match self.query_provider(provider.as_ref(), origin, destination).await {
            Ok(route) => {
                if let Some(cache) = &self.cache {
                    cache.set_json(&key, &route, cache.config().route_ttl).await;
                }
                route
            }
            Err(e) => {
                log::warn!("⚠️ Proveedor de rutas no disponible, usando estimación: {}", e);
                estimate_route(origin, destination)
            }
        }
    }
}
