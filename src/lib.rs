//! PrivateLimo backend
//!
//! Motor de cotizaciones: reglas tarifarias, recargos por zona geográfica y
//! ciclo de vida de cotizaciones con vencimiento.

pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use state::AppState;
pub use utils::errors::{AppError, AppResult};
