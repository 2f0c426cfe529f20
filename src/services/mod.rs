//! Services module
//!
//! Lógica de negocio: geometría de zonas, reglas tarifarias, cálculo de
//! precios, rutas y ciclo de vida de cotizaciones.

pub mod fare_rule_engine;
pub mod geo_polygon;
pub mod price_calculator;
pub mod pricing_service;
pub mod quotation_service;
pub mod route_service;
pub mod zone_service;

pub use fare_rule_engine::FareRuleEngine;
pub use pricing_service::PricingService;
pub use quotation_service::{QuotationService, QuotationSettings};
pub use route_service::{MapboxDirectionsProvider, RouteProvider, RouteService};
pub use zone_service::ZoneService;
