//! DTOs
//!
//! Estructuras de entrada (validadas con `validator`) y de salida de la API.

pub mod api_response;
pub mod pagination;
pub mod quotation_dto;
pub mod zone_dto;

pub use api_response::ApiResponse;
pub use pagination::{Paginated, PaginationMeta};
