//! Desglose de precios
//!
//! Resultado del PriceCalculator. Se guarda tal cual dentro de la cotización
//! (columna `price_breakdown`), por lo que debe ser estable al serializar.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Línea del desglose. Los descuentos llevan monto negativo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLine {
    pub description: String,
    pub amount: Decimal,
}

impl PriceLine {
    pub fn new(description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub base_price: Decimal,
    pub distance_price: Decimal,
    pub time_price: Decimal,
    pub surge_multiplier: Decimal,
    pub surge_price: Decimal,
    /// Cargos fijos de reglas TIME_BASED
    pub rule_charges: Decimal,
    pub zone_percentage: Decimal,
    pub zones_surcharge: Decimal,
    pub subtotal: Decimal,
    pub discounts: Decimal,
    pub total_price: Decimal,
    pub items: Vec<PriceLine>,
    pub applied_rules: Vec<String>,
}

impl PriceBreakdown {
    pub fn surge_active(&self) -> bool {
        self.surge_multiplier > Decimal::ONE
    }
}
