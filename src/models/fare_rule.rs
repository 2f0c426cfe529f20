//! Modelo de FareRule
//!
//! Las reglas tarifarias se persisten con un tipo (`rule_type`) y un payload
//! JSON de condiciones. Al cargarlas se convierten en la variante cerrada
//! [`FareRuleKind`], de modo que una condición mal formada se detecta al leer
//! la regla y no al evaluarla.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// Tipo de regla - mapea al enum `fare_rule_type` de PostgreSQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "fare_rule_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FareRuleType {
    Surge,
    TimeBased,
    ZoneBased,
    Discount,
}

/// Franja horaria en horas locales (0..=24). Si `start > end` la franja
/// cruza la medianoche.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HourRange {
    pub start: u8,
    pub end: u8,
}

impl HourRange {
    pub fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    /// Semiabierta `[start, end)`: `start == end` no contiene ninguna hora
    pub fn contains(&self, hour: u32) -> bool {
        let (start, end) = (u32::from(self.start), u32::from(self.end));
        if start < end {
            hour >= start && hour < end
        } else if start > end {
            hour >= start || hour < end
        } else {
            false
        }
    }

    /// Cerrada `[start, end]`: la hora `end` completa queda incluida
    pub fn contains_through_end(&self, hour: u32) -> bool {
        let (start, end) = (u32::from(self.start), u32::from(self.end));
        if start <= end {
            hour >= start && hour <= end
        } else {
            hour >= start || hour <= end
        }
    }
}

/// Una lista vacía de franjas significa "todo el día"
pub fn any_range_contains(ranges: &[HourRange], hour: u32) -> bool {
    ranges.is_empty() || ranges.iter().any(|r| r.contains(hour))
}

/// Las franjas de hora pico incluyen la hora de cierre: `{7, 9}` cubre de
/// 07:00 a 09:59.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SurgeCondition {
    #[serde(default)]
    pub time_ranges: Vec<HourRange>,
    /// 0 = domingo ... 6 = sábado. `None` o vacío: todos los días.
    #[serde(default, alias = "dayOfWeek")]
    pub days_of_week: Option<Vec<u8>>,
}

impl SurgeCondition {
    pub fn matches(&self, hour: u32, weekday: u32) -> bool {
        let day_ok = match &self.days_of_week {
            Some(days) if !days.is_empty() => days.iter().any(|d| u32::from(*d) == weekday),
            _ => true,
        };
        let hour_ok = self.time_ranges.is_empty()
            || self.time_ranges.iter().any(|r| r.contains_through_end(hour));
        hour_ok && day_ok
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TimeBasedCondition {
    #[serde(default)]
    pub time_ranges: Vec<HourRange>,
}

impl TimeBasedCondition {
    pub fn matches(&self, hour: u32) -> bool {
        any_range_contains(&self.time_ranges, hour)
    }
}

/// Variante cerrada por tipo de regla
#[derive(Debug, Clone, PartialEq)]
pub enum FareRuleKind {
    Surge {
        condition: SurgeCondition,
        multiplier: Decimal,
    },
    TimeBased {
        condition: TimeBasedCondition,
        amount: Decimal,
    },
    /// Reconocida pero sin efecto: los recargos por zona los resuelve el
    /// ZoneService.
    ZoneBased,
    /// Reconocida pero sin efecto hasta que exista un mecanismo de promociones.
    Discount { amount: Decimal },
}

/// Fila cruda de la tabla fare_rules
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FareRuleRow {
    pub id: Uuid,
    pub service_id: Uuid,
    pub name: String,
    pub rule_type: FareRuleType,
    pub conditions: serde_json::Value,
    pub multiplier: Option<Decimal>,
    pub fixed_amount: Option<Decimal>,
    pub priority: i32,
    pub is_active: bool,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum RuleConfigError {
    #[error("regla {rule_id}: condiciones inválidas: {source}")]
    InvalidConditions {
        rule_id: Uuid,
        #[source]
        source: serde_json::Error,
    },

    #[error("regla {rule_id}: franja horaria fuera de rango ({start}-{end})")]
    InvalidHourRange { rule_id: Uuid, start: u8, end: u8 },

    #[error("regla {rule_id}: día de la semana inválido ({day})")]
    InvalidWeekday { rule_id: Uuid, day: u8 },

    #[error("regla {rule_id}: multiplicador ausente o menor a 1")]
    InvalidMultiplier { rule_id: Uuid },

    #[error("regla {rule_id}: monto fijo ausente o negativo")]
    InvalidAmount { rule_id: Uuid },
}

/// Regla tarifaria validada
#[derive(Debug, Clone, PartialEq)]
pub struct FareRule {
    pub id: Uuid,
    pub service_id: Uuid,
    pub name: String,
    pub kind: FareRuleKind,
    pub priority: i32,
    pub is_active: bool,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl FareRule {
    /// Ventana de vigencia inclusiva en ambos extremos; sin límites = siempre vigente
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.valid_from.map_or(true, |from| at >= from)
            && self.valid_until.map_or(true, |until| at <= until)
    }
}

fn check_ranges(rule_id: Uuid, ranges: &[HourRange]) -> Result<(), RuleConfigError> {
    match ranges.iter().find(|r| r.start > 24 || r.end > 24) {
        Some(r) => Err(RuleConfigError::InvalidHourRange {
            rule_id,
            start: r.start,
            end: r.end,
        }),
        None => Ok(()),
    }
}

fn parse_conditions<T: serde::de::DeserializeOwned + Default>(
    rule_id: Uuid,
    value: serde_json::Value,
) -> Result<T, RuleConfigError> {
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value)
        .map_err(|source| RuleConfigError::InvalidConditions { rule_id, source })
}

impl TryFrom<FareRuleRow> for FareRule {
    type Error = RuleConfigError;

    fn try_from(row: FareRuleRow) -> Result<Self, Self::Error> {
        let rule_id = row.id;
        let kind = match row.rule_type {
            FareRuleType::Surge => {
                let condition: SurgeCondition = parse_conditions(rule_id, row.conditions)?;
                check_ranges(rule_id, &condition.time_ranges)?;
                if let Some(day) = condition
                    .days_of_week
                    .iter()
                    .flatten()
                    .find(|d| **d > 6)
                {
                    return Err(RuleConfigError::InvalidWeekday { rule_id, day: *day });
                }
                let multiplier = row
                    .multiplier
                    .filter(|m| *m >= Decimal::ONE)
                    .ok_or(RuleConfigError::InvalidMultiplier { rule_id })?;
                FareRuleKind::Surge {
                    condition,
                    multiplier,
                }
            }
            FareRuleType::TimeBased => {
                let condition: TimeBasedCondition = parse_conditions(rule_id, row.conditions)?;
                check_ranges(rule_id, &condition.time_ranges)?;
                let amount = row
                    .fixed_amount
                    .filter(|a| !a.is_sign_negative())
                    .ok_or(RuleConfigError::InvalidAmount { rule_id })?;
                FareRuleKind::TimeBased { condition, amount }
            }
            FareRuleType::ZoneBased => FareRuleKind::ZoneBased,
            FareRuleType::Discount => {
                let amount = row.fixed_amount.unwrap_or(Decimal::ZERO);
                if amount.is_sign_negative() {
                    return Err(RuleConfigError::InvalidAmount { rule_id });
                }
                FareRuleKind::Discount { amount }
            }
        };

        Ok(FareRule {
            id: row.id,
            service_id: row.service_id,
            name: row.name,
            kind,
            priority: row.priority,
            is_active: row.is_active,
            valid_from: row.valid_from,
            valid_until: row.valid_until,
            created_at: row.created_at,
        })
    }
}
