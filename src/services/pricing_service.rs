//! Servicio de precios
//!
//! Une el catálogo de servicios, el motor de reglas y la calculadora.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use uuid::Uuid;

use super::{
    fare_rule_engine::FareRuleEngine,
    price_calculator::{self, Discount, PriceOverflow, TripMetrics},
    zone_service::TripSurcharge,
};
use crate::{
    dto::quotation_dto::{PriceEstimate, PriceRange},
    models::{PriceBreakdown, Service, ServiceSummary},
    repositories::ServiceRepository,
    utils::{
        clock::Clock,
        errors::{not_found_error, AppError, AppResult},
        format::round_money,
    },
};

/// Recargo de zona asumido para el máximo de una estimación
const ESTIMATE_ZONE_PERCENTAGE: Decimal = Decimal::from_parts(20, 0, 0, false, 0);
/// Margen por tarifa dinámica en el máximo de una estimación
const ESTIMATE_SURGE_FACTOR: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

fn overflow_error(err: PriceOverflow) -> AppError {
    log::warn!("⚠️ Cálculo de precio fuera de rango: {}", err);
    AppError::BadRequest("Los datos del viaje producen un precio fuera de rango".to_string())
}

pub struct PricingService {
    services: Arc<dyn ServiceRepository>,
    engine: FareRuleEngine,
    clock: Arc<dyn Clock>,
}

impl PricingService {
    pub fn new(
        services: Arc<dyn ServiceRepository>,
        engine: FareRuleEngine,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            services,
            engine,
            clock,
        }
    }

    pub fn engine(&self) -> &FareRuleEngine {
        &self.engine
    }

    /// Servicios activos ordenados por nombre
    pub async fn list_services(&self) -> AppResult<Vec<Service>> {
        self.services.list_active().await
    }

    pub async fn get_service(&self, service_id: Uuid) -> AppResult<Service> {
        self.services
            .find_by_id(service_id)
            .await?
            .ok_or_else(|| not_found_error("Servicio", service_id))
    }

    /// Precio de un viaje para un servicio ya cargado
    pub async fn price_trip(
        &self,
        service: &Service,
        trip: TripMetrics,
        pickup_at: DateTime<Utc>,
        zones: &TripSurcharge,
    ) -> AppResult<PriceBreakdown> {
        let rules = self.engine.evaluate(service.id, pickup_at).await?;
        price_calculator::calculate(service, trip, &rules, zones, &Discount::none())
            .map_err(overflow_error)
    }

    pub async fn calculate(
        &self,
        service_id: Uuid,
        trip: TripMetrics,
        pickup_at: DateTime<Utc>,
        zones: &TripSurcharge,
    ) -> AppResult<PriceBreakdown> {
        let service = self.get_service(service_id).await?;
        self.price_trip(&service, trip, pickup_at, zones).await
    }

    /// Rango de precios sin ruta real: 40 km/h para derivar minutos; el mínimo
    /// sin zonas y el máximo con 20 % de zona y un 50 % extra por demanda.
    pub async fn estimate_price_range(
        &self,
        service_id: Uuid,
        distance_km: Decimal,
    ) -> AppResult<PriceEstimate> {
        let service = self.get_service(service_id).await?;
        let now = self.clock.now();

        let estimated_minutes = distance_km
            .checked_mul(Decimal::new(15, 1))
            .ok_or_else(|| overflow_error(PriceOverflow))?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i32()
            .unwrap_or(i32::MAX);
        let trip = TripMetrics {
            distance_km,
            duration_minutes: estimated_minutes,
        };

        let min = self
            .price_trip(&service, trip, now, &TripSurcharge::default())
            .await?;
        let with_zone = TripSurcharge {
            percentage: ESTIMATE_ZONE_PERCENTAGE,
            ..TripSurcharge::default()
        };
        let max = self.price_trip(&service, trip, now, &with_zone).await?;
        let max_total = max
            .total_price
            .checked_mul(ESTIMATE_SURGE_FACTOR)
            .ok_or_else(|| overflow_error(PriceOverflow))?;

        Ok(PriceEstimate {
            service: ServiceSummary::from(&service),
            estimated_minutes,
            price_range: PriceRange {
                min: min.total_price,
                max: round_money(max_total),
            },
        })
    }
}
