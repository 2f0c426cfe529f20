//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    cache::RedisClient,
    config::EnvironmentConfig,
    database::seed::DemoCatalog,
    repositories::{
        InMemoryQuotationRepository, InMemoryServiceRepository, InMemoryZoneRepository,
        PgQuotationRepository, PgServiceRepository, PgZoneRepository, QuotationRepository,
        ServiceRepository, ZoneRepository,
    },
    services::{
        FareRuleEngine, PricingService, QuotationService, QuotationSettings, RouteService,
        ZoneService,
    },
    utils::clock::Clock,
};

/// Backend de persistencia
#[derive(Clone)]
pub struct Repositories {
    pub services: Arc<dyn ServiceRepository>,
    pub zones: Arc<dyn ZoneRepository>,
    pub quotations: Arc<dyn QuotationRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            services: Arc::new(PgServiceRepository::new(pool.clone())),
            zones: Arc::new(PgZoneRepository::new(pool.clone())),
            quotations: Arc::new(PgQuotationRepository::new(pool)),
        }
    }

    /// Repositorios en memoria precargados con un catálogo
    pub fn in_memory(catalog: DemoCatalog) -> Self {
        Self {
            services: Arc::new(InMemoryServiceRepository::new(
                catalog.services,
                catalog.rules,
            )),
            zones: Arc::new(InMemoryZoneRepository::new(catalog.zones)),
            quotations: Arc::new(InMemoryQuotationRepository::new()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub pricing: Arc<PricingService>,
    pub zones: Arc<ZoneService>,
    pub quotations: Arc<QuotationService>,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        repositories: Repositories,
        routes: RouteService,
        cache: Option<RedisClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let engine = FareRuleEngine::new(repositories.services.clone(), config.pricing_utc_offset);
        let pricing = Arc::new(PricingService::new(
            repositories.services,
            engine,
            clock.clone(),
        ));
        let zones = Arc::new(ZoneService::new(
            repositories.zones,
            cache,
            clock.clone(),
        ));
        let settings = QuotationSettings {
            ttl: config.quotation_ttl(),
            currency: config.currency.clone(),
            whatsapp_business_number: config.whatsapp_business_number.clone(),
        };
        let quotations = Arc::new(QuotationService::new(
            repositories.quotations,
            pricing.clone(),
            zones.clone(),
            Arc::new(routes),
            clock,
            settings,
        ));

        Self {
            config: Arc::new(config),
            pricing,
            zones,
            quotations,
        }
    }
}
