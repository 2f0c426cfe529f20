//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean al schema PostgreSQL
//! (servicios, reglas tarifarias, zonas y cotizaciones).

pub mod fare_rule;
pub mod geo;
pub mod pricing;
pub mod quotation;
pub mod route;
pub mod service;
pub mod zone;

pub use fare_rule::*;
pub use geo::GeoPoint;
pub use pricing::*;
pub use quotation::*;
pub use route::*;
pub use service::*;
pub use zone::*;
