//! Controllers
//!
//! Adaptan los servicios a las respuestas de la API.

pub mod quotation_controller;
pub mod zone_controller;

pub use quotation_controller::QuotationController;
pub use zone_controller::ZoneController;
