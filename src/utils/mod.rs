//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación,
//! JWT, formateo y la fuente de tiempo.

pub mod clock;
pub mod errors;
pub mod format;
pub mod jwt;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{AppError, AppResult};
