//! Ciclo de vida de cotizaciones
//!
//! PENDING -> ACCEPTED | EXPIRED. La expiración es perezosa: cada lectura
//! de una cotización PENDING vencida la pasa a EXPIRED con una actualización
//! condicional, de modo que lecturas concurrentes no se pisan. El barrido
//! periódico es opcional y usa la misma condición.

use std::{collections::HashMap, sync::Arc, time::Duration as StdDuration};

use chrono::{DateTime, Duration, Utc};
use futures::future;
use sqlx::types::Json;
use tokio::task::JoinHandle;
use uuid::Uuid;
use validator::Validate;

use super::{
    price_calculator::TripMetrics, pricing_service::PricingService, route_service::RouteService,
    zone_service::ZoneService,
};
use crate::{
    dto::{
        pagination::{self, Paginated, PaginationMeta},
        quotation_dto::{
            CreateQuotationRequest, EstimateQuery, PriceEstimate, QuickQuoteQuery,
            QuickQuotePricing, QuickQuoteResponse, QuickQuoteRoute, QuotationResponse,
            WhatsAppMessage,
        },
    },
    models::{
        Quotation, QuotationBreakdown, QuotationStatus, ServiceSummary, TripZoneNames,
    },
    repositories::QuotationRepository,
    utils::{
        clock::Clock,
        errors::{validation_error, AppError, AppResult},
        format::{expires_in, format_price},
    },
};

/// Parámetros del ciclo de vida
#[derive(Debug, Clone)]
pub struct QuotationSettings {
    pub ttl: Duration,
    pub currency: String,
    pub whatsapp_business_number: String,
}

impl Default for QuotationSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(30),
            currency: "ARS".to_string(),
            whatsapp_business_number: "+1234567890".to_string(),
        }
    }
}

pub struct QuotationService {
    repo: Arc<dyn QuotationRepository>,
    pricing: Arc<PricingService>,
    zones: Arc<ZoneService>,
    routes: Arc<RouteService>,
    clock: Arc<dyn Clock>,
    settings: QuotationSettings,
}

impl QuotationService {
    pub fn new(
        repo: Arc<dyn QuotationRepository>,
        pricing: Arc<PricingService>,
        zones: Arc<ZoneService>,
        routes: Arc<RouteService>,
        clock: Arc<dyn Clock>,
        settings: QuotationSettings,
    ) -> Self {
        Self {
            repo,
            pricing,
            zones,
            routes,
            clock,
            settings,
        }
    }

    fn validity_text(&self) -> String {
        format!("{} minutos", self.settings.ttl.num_minutes())
    }

    fn to_response(
        &self,
        quotation: Quotation,
        service: Option<ServiceSummary>,
        now: DateTime<Utc>,
    ) -> QuotationResponse {
        QuotationResponse {
            formatted_price: format_price(quotation.total_price, &self.settings.currency),
            expires_in: expires_in(
                quotation.expires_at,
                now,
                quotation.status == QuotationStatus::Expired,
            ),
            service,
            quotation,
        }
    }

    async fn service_summary(&self, service_id: Uuid) -> Option<ServiceSummary> {
        match self.pricing.get_service(service_id).await {
            Ok(service) => Some(ServiceSummary::from(&service)),
            Err(e) => {
                log::warn!("⚠️ No se pudo cargar el servicio {}: {}", service_id, e);
                None
            }
        }
    }

    async fn find(&self, id: Uuid) -> AppResult<Quotation> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cotización no encontrada".to_string()))
    }

    /// Aplica la expiración perezosa. Si otra operación cambió el estado
    /// antes que nosotros, devuelve el registro tal como quedó.
    async fn refresh_expiry(
        &self,
        quotation: Quotation,
        now: DateTime<Utc>,
    ) -> AppResult<Quotation> {
        if !quotation.needs_expiry(now) {
            return Ok(quotation);
        }

        if self.repo.mark_expired(quotation.id, now).await? {
            log::info!("⌛ Cotización {} expirada", quotation.id);
            return Ok(Quotation {
                status: QuotationStatus::Expired,
                ..quotation
            });
        }

        Ok(self.repo.find_by_id(quotation.id).await?.unwrap_or(quotation))
    }

    pub async fn create(
        &self,
        request: CreateQuotationRequest,
        user_id: Option<Uuid>,
    ) -> AppResult<QuotationResponse> {
        request.validate()?;
        let now = self.clock.now();

        if request.requested_date <= now {
            return Err(validation_error(
                "requestedDate",
                "La fecha solicitada debe ser futura",
            ));
        }

        let service = self.pricing.get_service(request.service_id).await?;
        if !service.is_active {
            return Err(validation_error(
                "serviceId",
                "El servicio no está disponible",
            ));
        }
        if request.passenger_count > service.max_passengers {
            return Err(validation_error(
                "passengerCount",
                format!(
                    "El servicio admite como máximo {} pasajeros",
                    service.max_passengers
                ),
            ));
        }

        let pickup = request.pickup();
        let dropoff = request.dropoff();
        let (route, trip_zones) = future::join(
            self.routes.calculate_route(&pickup, &dropoff),
            self.zones.resolve_for_trip(&pickup, &dropoff),
        )
        .await;
        let trip_zones = trip_zones?;
        let trip = TripMetrics {
            distance_km: route.distance_km(),
            duration_minutes: route.duration_minutes(),
        };
        let pricing = self
            .pricing
            .price_trip(&service, trip, request.requested_date, &trip_zones)
            .await?;

        let quotation = Quotation {
            id: Uuid::new_v4(),
            user_id,
            service_id: service.id,
            pickup_address: request.pickup_address,
            pickup_lat: request.pickup_lat,
            pickup_lng: request.pickup_lng,
            dropoff_address: request.dropoff_address,
            dropoff_lat: request.dropoff_lat,
            dropoff_lng: request.dropoff_lng,
            distance_km: trip.distance_km,
            duration_minutes: trip.duration_minutes,
            base_price: pricing.base_price,
            distance_price: pricing.distance_price,
            time_price: pricing.time_price,
            surge_price: pricing.surge_price,
            zones_surcharge: pricing.zones_surcharge,
            discounts: pricing.discounts,
            total_price: pricing.total_price,
            price_breakdown: Json(QuotationBreakdown {
                pricing,
                route,
                zones: TripZoneNames {
                    pickup: trip_zones.pickup_zone.map(|z| z.name),
                    dropoff: trip_zones.dropoff_zone.map(|z| z.name),
                },
            }),
            requested_date: request.requested_date,
            passenger_count: request.passenger_count,
            special_requirements: request
                .special_requirements
                .filter(|s| !s.trim().is_empty()),
            status: QuotationStatus::Pending,
            created_at: now,
            expires_at: now + self.settings.ttl,
            accepted_at: None,
        };

        let quotation = self.repo.insert(&quotation).await?;
        log::info!(
            "✅ Cotización {} creada: {} ({})",
            quotation.id,
            quotation.total_price,
            service.name
        );

        Ok(self.to_response(quotation, Some(ServiceSummary::from(&service)), now))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<QuotationResponse> {
        let now = self.clock.now();
        let quotation = self.find(id).await?;
        let quotation = self.refresh_expiry(quotation, now).await?;
        let service = self.service_summary(quotation.service_id).await;
        Ok(self.to_response(quotation, service, now))
    }

    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> AppResult<Paginated<QuotationResponse>> {
        let (page, limit) = pagination::normalize(page, limit);
        let now = self.clock.now();
        let (quotations, total) = self
            .repo
            .list_by_user(user_id, i64::from(limit), pagination::offset(page, limit))
            .await?;

        let mut services: HashMap<Uuid, Option<ServiceSummary>> = HashMap::new();
        let mut items = Vec::with_capacity(quotations.len());
        for quotation in quotations {
            let quotation = self.refresh_expiry(quotation, now).await?;
            if !services.contains_key(&quotation.service_id) {
                let summary = self.service_summary(quotation.service_id).await;
                services.insert(quotation.service_id, summary);
            }
            let service = services.get(&quotation.service_id).cloned().flatten();
            items.push(self.to_response(quotation, service, now));
        }

        Ok(Paginated {
            items,
            pagination: PaginationMeta::new(page, limit, total),
        })
    }

    /// Acepta una cotización PENDING no vencida.
    ///
    /// El control de dueño solo aplica si tanto el solicitante como la
    /// cotización tienen usuario. Dos aceptaciones concurrentes compiten en
    /// `mark_accepted`; la perdedora recibe `Conflict`.
    pub async fn accept(&self, id: Uuid, requester: Option<Uuid>) -> AppResult<QuotationResponse> {
        let quotation = self.find(id).await?;

        if let (Some(requester), Some(owner)) = (requester, quotation.user_id) {
            if requester != owner {
                return Err(AppError::Forbidden(
                    "No tiene permiso para aceptar esta cotización".to_string(),
                ));
            }
        }

        let now = self.clock.now();
        if quotation.is_overdue(now) {
            self.refresh_expiry(quotation, now).await?;
            return Err(AppError::Conflict("La cotización ha expirado".to_string()));
        }

        if quotation.status.is_terminal() {
            return Err(AppError::Conflict(
                "La cotización ya no está disponible".to_string(),
            ));
        }

        match self.repo.mark_accepted(id, now).await? {
            Some(accepted) => {
                log::info!("🤝 Cotización {} aceptada", id);
                let service = self.service_summary(accepted.service_id).await;
                Ok(self.to_response(accepted, service, now))
            }
            None => {
                let current = self.find(id).await?;
                log::info!(
                    "Aceptación concurrente rechazada para cotización {} (estado: {:?})",
                    id,
                    current.status
                );
                Err(AppError::Conflict(
                    "La cotización ya fue procesada".to_string(),
                ))
            }
        }
    }

    /// Vista previa de precio para "ahora", sin persistir
    pub async fn quick_quote(&self, query: QuickQuoteQuery) -> AppResult<QuickQuoteResponse> {
        query.validate()?;
        let service = self.pricing.get_service(query.service_id).await?;
        let pickup = query.pickup();
        let dropoff = query.dropoff();

        let (route, trip_zones) = future::join(
            self.routes.calculate_route(&pickup, &dropoff),
            self.zones.resolve_for_trip(&pickup, &dropoff),
        )
        .await;
        let trip_zones = trip_zones?;
        let trip = TripMetrics {
            distance_km: route.distance_km(),
            duration_minutes: route.duration_minutes(),
        };
        let pricing = self
            .pricing
            .price_trip(&service, trip, self.clock.now(), &trip_zones)
            .await?;

        Ok(QuickQuoteResponse {
            service: ServiceSummary::from(&service),
            route: QuickQuoteRoute {
                distance: route.distance_text.clone(),
                duration: route.duration_text.clone(),
                distance_km: trip.distance_km,
                duration_minutes: trip.duration_minutes,
            },
            pricing: QuickQuotePricing {
                formatted_price: format_price(pricing.total_price, &self.settings.currency),
                surge_active: pricing.surge_active(),
                surge_multiplier: pricing.surge_multiplier,
                total_price: pricing.total_price,
                breakdown: pricing.items,
            },
            zones: TripZoneNames {
                pickup: trip_zones.pickup_zone.map(|z| z.name),
                dropoff: trip_zones.dropoff_zone.map(|z| z.name),
            },
            valid_for: self.validity_text(),
        })
    }

    pub async fn estimate(&self, query: EstimateQuery) -> AppResult<PriceEstimate> {
        query.validate()?;
        self.pricing
            .estimate_price_range(query.service_id, query.distance_km)
            .await
    }

    /// Resumen en texto plano para compartir por WhatsApp
    pub async fn whatsapp_message(&self, id: Uuid) -> AppResult<WhatsAppMessage> {
        let response = self.get(id).await?;
        let quotation = &response.quotation;
        let route = &quotation.price_breakdown.route;
        let service_name = response
            .service
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or("-");
        let requested = quotation
            .requested_date
            .with_timezone(&self.pricing.engine().offset())
            .format("%d/%m/%Y %H:%M");

        let message = format!(
            "🚗 *COTIZACIÓN PRIVATELIMO*\n\
             \n\
             📍 *Recorrido:*\n\
             Desde: {}\n\
             Hasta: {}\n\
             \n\
             📊 *Detalles del viaje:*\n\
             • Distancia: {}\n\
             • Duración estimada: {}\n\
             • Servicio: {}\n\
             • Pasajeros: {}\n\
             \n\
             💰 *Precio Total: {}*\n\
             \n\
             📅 Fecha solicitada: {}\n\
             \n\
             ⏱️ Esta cotización es válida por {}\n\
             \n\
             Para confirmar su reserva, responda \"CONFIRMAR\" o contáctenos al {}\n\
             \n\
             _Gracias por elegir PrivateLimo_",
            quotation.pickup_address,
            quotation.dropoff_address,
            route.distance_text,
            route.duration_text,
            service_name,
            quotation.passenger_count,
            response.formatted_price,
            requested,
            response.expires_in,
            self.settings.whatsapp_business_number,
        );

        Ok(WhatsAppMessage {
            message,
            phone_number: self.settings.whatsapp_business_number.clone(),
        })
    }

    /// Expira en bloque las cotizaciones PENDING vencidas
    pub async fn sweep_expired(&self) -> AppResult<u64> {
        let expired = self.repo.expire_overdue(self.clock.now()).await?;
        if expired > 0 {
            log::info!("⌛ Barrido de expiración: {} cotizaciones expiradas", expired);
        }
        Ok(expired)
    }

    pub fn spawn_expiry_sweeper(self: Arc<Self>, every: StdDuration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = self.sweep_expired().await {
                    log::warn!("⚠️ Falló el barrido de expiración: {}", e);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        database::seed,
        models::{GeoPoint, RouteInfo, RouteSource},
        repositories::{
            InMemoryQuotationRepository, InMemoryServiceRepository, InMemoryZoneRepository,
            ServiceRepository,
        },
        services::{
            fare_rule_engine::FareRuleEngine,
            route_service::{RouteError, RouteProvider},
        },
        utils::{
            clock::ManualClock,
            format::{distance_text, duration_text},
        },
    };
    use async_trait::async_trait;
    use chrono::{FixedOffset, TimeZone};
    use rust_decimal_macros::dec;

    struct FiveKmProvider;

    #[async_trait]
    impl RouteProvider for FiveKmProvider {
        async fn route(&self, _: &GeoPoint, _: &GeoPoint) -> Result<RouteInfo, RouteError> {
            Ok(RouteInfo {
                distance_meters: 5000,
                duration_seconds: 900,
                distance_text: distance_text(5000),
                duration_text: duration_text(900),
                polyline: None,
                source: RouteSource::Provider,
            })
        }
    }

    struct Fixture {
        service: QuotationService,
        clock: Arc<ManualClock>,
        sedan: Uuid,
    }

    fn fixture() -> Fixture {
        // martes 15:00 en Buenos Aires
        let now = Utc.with_ymd_and_hms(2024, 1, 16, 18, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(now));
        let catalog = seed::demo_catalog(now);
        let sedan = catalog.services[0].id;

        let services: Arc<dyn ServiceRepository> =
            Arc::new(InMemoryServiceRepository::new(catalog.services, catalog.rules));
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        let engine = FareRuleEngine::new(services.clone(), offset);
        let pricing = Arc::new(PricingService::new(services, engine, clock.clone()));
        let zones = Arc::new(ZoneService::new(
            Arc::new(InMemoryZoneRepository::new(catalog.zones)),
            None,
            clock.clone(),
        ));
        let routes = Arc::new(RouteService::new(
            Some(Arc::new(FiveKmProvider)),
            StdDuration::from_secs(1),
            None,
        ));

        Fixture {
            service: QuotationService::new(
                Arc::new(InMemoryQuotationRepository::new()),
                pricing,
                zones,
                routes,
                clock.clone(),
                QuotationSettings::default(),
            ),
            clock,
            sedan,
        }
    }

    fn request(service_id: Uuid, requested_date: DateTime<Utc>) -> CreateQuotationRequest {
        CreateQuotationRequest {
            service_id,
            pickup_address: "Av. Santa Fe 3200".to_string(),
            pickup_lat: -34.5880,
            pickup_lng: -58.4100,
            dropoff_address: "Av. Cabildo 2000".to_string(),
            dropoff_lat: -34.5620,
            dropoff_lng: -58.4560,
            requested_date,
            passenger_count: 2,
            special_requirements: None,
        }
    }

    #[tokio::test]
    async fn test_create_prices_and_sets_expiry() {
        let f = fixture();
        let now = f.clock.now();
        let response = f
            .service
            .create(request(f.sedan, now + Duration::hours(1)), None)
            .await
            .unwrap();

        let q = &response.quotation;
        assert_eq!(q.status, QuotationStatus::Pending);
        assert_eq!(q.total_price, dec!(4000));
        assert_eq!(q.distance_km, dec!(5.000));
        assert_eq!(q.duration_minutes, 15);
        assert_eq!(q.expires_at, now + Duration::minutes(30));
        assert_eq!(q.price_breakdown.pricing.total_price, q.total_price);
        assert_eq!(response.formatted_price, "$ 4.000,00");
        assert_eq!(response.expires_in, "30 minutos");
        assert_eq!(response.service.as_ref().unwrap().name, "Sedán Ejecutivo");
    }

    #[tokio::test]
    async fn test_create_rejects_past_date_and_too_many_passengers() {
        let f = fixture();
        let now = f.clock.now();

        let err = f
            .service
            .create(request(f.sedan, now - Duration::minutes(1)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut req = request(f.sedan, now + Duration::hours(1));
        req.passenger_count = 5;
        let err = f.service.create(req, None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = f
            .service
            .create(request(Uuid::new_v4(), now + Duration::hours(1)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_read_after_ttl_expires_and_accept_is_rejected() {
        let f = fixture();
        let created = f
            .service
            .create(request(f.sedan, f.clock.now() + Duration::hours(2)), None)
            .await
            .unwrap();
        let id = created.quotation.id;

        f.clock.advance(Duration::minutes(31));
        let read = f.service.get(id).await.unwrap();
        assert_eq!(read.quotation.status, QuotationStatus::Expired);
        assert_eq!(read.expires_in, "Expirada");

        let err = f.service.accept(id, None).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_accept_checks_owner_and_is_single_shot() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let created = f
            .service
            .create(request(f.sedan, f.clock.now() + Duration::hours(2)), Some(owner))
            .await
            .unwrap();
        let id = created.quotation.id;

        let err = f.service.accept(id, Some(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        f.clock.advance(Duration::minutes(10));
        let accepted = f.service.accept(id, Some(owner)).await.unwrap();
        assert_eq!(accepted.quotation.status, QuotationStatus::Accepted);
        assert_eq!(accepted.quotation.accepted_at, Some(f.clock.now()));

        let err = f.service.accept(id, Some(owner)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // una cotización aceptada no expira
        f.clock.advance(Duration::hours(1));
        let read = f.service.get(id).await.unwrap();
        assert_eq!(read.quotation.status, QuotationStatus::Accepted);
    }

    #[tokio::test]
    async fn test_list_for_user_and_sweep() {
        let f = fixture();
        let user = Uuid::new_v4();
        let date = f.clock.now() + Duration::hours(3);
        for _ in 0..3 {
            f.service.create(request(f.sedan, date), Some(user)).await.unwrap();
        }
        f.service.create(request(f.sedan, date), None).await.unwrap();

        let page = f.service.list_for_user(user, Some(1), Some(2)).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);

        f.clock.advance(Duration::minutes(45));
        assert_eq!(f.service.sweep_expired().await.unwrap(), 4);
        assert_eq!(f.service.sweep_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_quick_quote_and_whatsapp() {
        let f = fixture();
        let quote = f
            .service
            .quick_quote(QuickQuoteQuery {
                service_id: f.sedan,
                pickup_lat: -34.5880,
                pickup_lng: -58.4100,
                dropoff_lat: -34.5620,
                dropoff_lng: -58.4560,
            })
            .await
            .unwrap();
        assert_eq!(quote.pricing.total_price, dec!(4000));
        assert!(!quote.pricing.surge_active);
        assert_eq!(quote.route.distance, "5.0 km");
        assert_eq!(quote.valid_for, "30 minutos");

        let created = f
            .service
            .create(request(f.sedan, f.clock.now() + Duration::hours(1)), None)
            .await
            .unwrap();
        let wa = f.service.whatsapp_message(created.quotation.id).await.unwrap();
        assert_eq!(wa.phone_number, "+1234567890");
        assert!(wa.message.contains("Av. Santa Fe 3200"));
        assert!(wa.message.contains("$ 4.000,00"));
        // 16:00 en Buenos Aires
        assert!(wa.message.contains("16/01/2024 16:00"));
    }
}
