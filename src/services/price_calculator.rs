//! Calculadora de precios
//!
//! Función pura: combina la tarifa del servicio, el resultado del motor de
//! reglas y los recargos de zona en un desglose itemizado. Cada componente se
//! redondea a centavos al calcularse, así las líneas suman exactamente el total.

use rust_decimal::Decimal;
use thiserror::Error;

use super::{fare_rule_engine::RuleEvaluation, zone_service::TripSurcharge};
use crate::{
    models::{PriceBreakdown, PriceLine, Service},
    utils::format::round_money,
};

/// Distancia y duración del viaje
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripMetrics {
    pub distance_km: Decimal,
    pub duration_minutes: i32,
}

/// Descuentos a aplicar sobre el subtotal. Hoy no hay mecanismo de
/// promociones, por lo que los llamadores pasan `Discount::none()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Discount {
    pub percentage: Decimal,
    pub fixed: Decimal,
}

impl Discount {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Algún componente del precio excede el rango de `Decimal`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("el precio calculado excede el rango representable")]
pub struct PriceOverflow;

fn mul(a: Decimal, b: Decimal) -> Result<Decimal, PriceOverflow> {
    a.checked_mul(b).ok_or(PriceOverflow)
}

fn add(a: Decimal, b: Decimal) -> Result<Decimal, PriceOverflow> {
    a.checked_add(b).ok_or(PriceOverflow)
}

fn percent_of(amount: Decimal, percentage: Decimal) -> Result<Decimal, PriceOverflow> {
    mul(amount, percentage)?
        .checked_div(Decimal::ONE_HUNDRED)
        .ok_or(PriceOverflow)
}

pub fn calculate(
    service: &Service,
    trip: TripMetrics,
    rules: &RuleEvaluation,
    zones: &TripSurcharge,
    discount: &Discount,
) -> Result<PriceBreakdown, PriceOverflow> {
    let mut items = Vec::new();

    let base_price = round_money(service.base_price);
    let billed_km = trip.distance_km.max(service.minimum_distance_km).max(Decimal::ZERO);
    let distance_price = round_money(mul(billed_km, service.price_per_km)?);
    let billed_minutes = trip
        .duration_minutes
        .max(service.minimum_duration_minutes)
        .max(0);
    let time_price = round_money(mul(Decimal::from(billed_minutes), service.price_per_minute)?);

    items.push(PriceLine::new("Tarifa base", base_price));
    items.push(PriceLine::new(
        format!("Distancia ({:.1} km)", trip.distance_km),
        distance_price,
    ));
    items.push(PriceLine::new(
        format!("Tiempo estimado ({} min)", trip.duration_minutes),
        time_price,
    ));

    let fare = add(add(base_price, distance_price)?, time_price)?;

    let mut rule_charges = Decimal::ZERO;
    for charge in &rules.fixed_charges {
        let amount = round_money(charge.amount);
        rule_charges = add(rule_charges, amount)?;
        items.push(PriceLine::new(charge.name.clone(), amount));
    }

    let surge_multiplier = rules.surge_multiplier;
    let surge_price = if surge_multiplier > Decimal::ONE {
        round_money(mul(fare, surge_multiplier - Decimal::ONE)?)
    } else {
        Decimal::ZERO
    };
    if surge_price > Decimal::ZERO {
        items.push(PriceLine::new(
            format!("Tarifa dinámica ({}x)", surge_multiplier.normalize()),
            surge_price,
        ));
    }

    let zone_percentage = zones.percentage;
    let zone_percentage_amount = round_money(percent_of(fare, zone_percentage)?);
    let zone_fixed_amount = round_money(zones.fixed);
    if !zone_percentage_amount.is_zero() {
        items.push(PriceLine::new(
            format!("Recargo de zona ({}%)", zone_percentage.normalize()),
            zone_percentage_amount,
        ));
    }
    if !zone_fixed_amount.is_zero() {
        items.push(PriceLine::new("Recargo de zona fijo", zone_fixed_amount));
    }
    let zones_surcharge = add(zone_percentage_amount, zone_fixed_amount)?;

    let subtotal = add(add(add(fare, surge_price)?, zones_surcharge)?, rule_charges)?;

    let discounts = add(
        round_money(percent_of(subtotal, discount.percentage)?),
        round_money(discount.fixed),
    )?;
    if discounts > Decimal::ZERO {
        items.push(PriceLine::new("Descuentos", -discounts));
    }

    let total_price = subtotal
        .checked_sub(discounts)
        .ok_or(PriceOverflow)?
        .max(Decimal::ZERO);

    Ok(PriceBreakdown {
        base_price,
        distance_price,
        time_price,
        surge_multiplier,
        surge_price,
        rule_charges,
        zone_percentage,
        zones_surcharge,
        subtotal,
        discounts,
        total_price,
        items,
        applied_rules: rules.applied_rules.clone(),
    })
}
