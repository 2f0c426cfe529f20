//! Utilidades de validación
//!
//! Validadores custom usados por los DTOs (`#[validate(custom = ...)]`).

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::{Validate, ValidationError};

use crate::models::GeoPoint;

lazy_static! {
    /// Slugs de zona: minúsculas, dígitos y guiones
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9-]+$").unwrap();
}

pub const MIN_POLYGON_VERTICES: usize = 3;

/// Media circunferencia terrestre: ningún viaje por ruta la supera
pub const MAX_TRIP_DISTANCE_KM: Decimal = Decimal::from_parts(20_000, 0, 0, false, 0);

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

/// Polígono con al menos 3 vértices y coordenadas dentro de rango
pub fn validate_polygon(polygon: &[GeoPoint]) -> Result<(), ValidationError> {
    if polygon.len() < MIN_POLYGON_VERTICES {
        return Err(error(
            "polygon_too_small",
            "El polígono debe tener al menos 3 puntos",
        ));
    }
    if polygon.iter().any(|p| p.validate().is_err()) {
        return Err(error(
            "polygon_out_of_range",
            "Coordenadas del polígono fuera de rango",
        ));
    }
    Ok(())
}

pub fn validate_percentage(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() || *value > Decimal::ONE_HUNDRED {
        return Err(error(
            "percentage_range",
            "El porcentaje debe estar entre 0 y 100",
        ));
    }
    Ok(())
}

pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(error("non_negative", "El monto no puede ser negativo"));
    }
    Ok(())
}

pub fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(error("positive", "El valor debe ser mayor a 0"));
    }
    Ok(())
}

/// Distancia de viaje en (0, MAX_TRIP_DISTANCE_KM]
pub fn validate_trip_distance(value: &Decimal) -> Result<(), ValidationError> {
    validate_positive(value)?;
    if *value > MAX_TRIP_DISTANCE_KM {
        return Err(error(
            "distance_range",
            "La distancia no puede superar los 20000 km",
        ));
    }
    Ok(())
}

/// Validar que un string no esté vacío
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("not_blank", "El campo no puede estar vacío"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_slug_regex() {
        assert!(SLUG_REGEX.is_match("aeropuerto-ezeiza"));
        assert!(SLUG_REGEX.is_match("zona-1"));
        assert!(!SLUG_REGEX.is_match("Puerto Madero"));
        assert!(!SLUG_REGEX.is_match(""));
    }

    #[test]
    fn test_polygon_validation() {
        let triangle = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 0.0),
        ];
        assert!(validate_polygon(&triangle).is_ok());
        assert!(validate_polygon(&triangle[..2]).is_err());

        let out_of_range = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(95.0, 1.0),
            GeoPoint::new(1.0, 0.0),
        ];
        assert!(validate_polygon(&out_of_range).is_err());
    }

    #[test]
    fn test_decimal_validators() {
        assert!(validate_percentage(&dec!(0)).is_ok());
        assert!(validate_percentage(&dec!(100)).is_ok());
        assert!(validate_percentage(&dec!(100.5)).is_err());
        assert!(validate_percentage(&dec!(-1)).is_err());
        assert!(validate_non_negative(&dec!(0)).is_ok());
        assert!(validate_non_negative(&dec!(-0.01)).is_err());
        assert!(validate_positive(&dec!(0)).is_err());
        assert!(validate_positive(&dec!(0.1)).is_ok());
        assert!(validate_trip_distance(&dec!(20000)).is_ok());
        assert!(validate_trip_distance(&dec!(20000.01)).is_err());
        assert!(validate_trip_distance(&dec!(0)).is_err());
    }
}
