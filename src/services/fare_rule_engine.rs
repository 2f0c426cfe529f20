//! Motor de reglas tarifarias
//!
//! Evalúa las reglas activas de un servicio para un instante dado:
//! - SURGE: coincide si la hora local cae en alguna franja Y el día está en
//!   el conjunto (si hay conjunto). Varias reglas se combinan por máximo.
//! - TIME_BASED: coincide solo por franja horaria; los montos se suman.
//! - ZONE_BASED y DISCOUNT: reconocidas, sin efecto aquí. Los recargos de
//!   zona los aplica el ZoneService.

use std::sync::Arc;

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    models::{FareRule, FareRuleKind},
    repositories::ServiceRepository,
    utils::errors::{AppError, AppResult},
};

/// Cargo fijo aportado por una regla
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleCharge {
    pub name: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEvaluation {
    pub surge_multiplier: Decimal,
    pub fixed_charges: Vec<RuleCharge>,
    pub applied_rules: Vec<String>,
}

impl Default for RuleEvaluation {
    fn default() -> Self {
        Self {
            surge_multiplier: Decimal::ONE,
            fixed_charges: Vec::new(),
            applied_rules: Vec::new(),
        }
    }
}

impl RuleEvaluation {
    pub fn fixed_total(&self) -> Decimal {
        self.fixed_charges.iter().map(|c| c.amount).sum()
    }
}

/// Evaluación pura sobre un conjunto de reglas ya cargado.
///
/// `offset` es la zona horaria del negocio: las franjas y los días de la
/// semana se interpretan en hora local.
pub fn evaluate_rules(
    rules: &[FareRule],
    at: DateTime<Utc>,
    offset: FixedOffset,
) -> RuleEvaluation {
    let local = at.with_timezone(&offset);
    let hour = local.hour();
    let weekday = local.weekday().num_days_from_sunday();

    let mut applicable: Vec<&FareRule> = rules
        .iter()
        .filter(|r| r.is_active && r.is_valid_at(at))
        .collect();
    applicable.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });

    let mut evaluation = RuleEvaluation::default();
    for rule in applicable {
        match &rule.kind {
            FareRuleKind::Surge {
                condition,
                multiplier,
            } => {
                if condition.matches(hour, weekday) {
                    evaluation.surge_multiplier = evaluation.surge_multiplier.max(*multiplier);
                    evaluation
                        .applied_rules
                        .push(format!("Tarifa dinámica: {}", rule.name));
                }
            }
            FareRuleKind::TimeBased { condition, amount } => {
                if condition.matches(hour) {
                    evaluation.fixed_charges.push(RuleCharge {
                        name: rule.name.clone(),
                        amount: *amount,
                    });
                    evaluation.applied_rules.push(rule.name.clone());
                }
            }
            FareRuleKind::ZoneBased | FareRuleKind::Discount { .. } => {}
        }
    }

    evaluation
}

pub struct FareRuleEngine {
    services: Arc<dyn ServiceRepository>,
    offset: FixedOffset,
}

impl FareRuleEngine {
    pub fn new(services: Arc<dyn ServiceRepository>, offset: FixedOffset) -> Self {
        Self { services, offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Carga y valida las reglas activas del servicio
    pub async fn load_rules(&self, service_id: Uuid) -> AppResult<Vec<FareRule>> {
        let rows = self.services.active_rules_for_service(service_id).await?;
        rows.into_iter()
            .map(|row| {
                let rule_id = row.id;
                FareRule::try_from(row).map_err(|e| {
                    log::error!(
                        "❌ Regla tarifaria {} del servicio {} mal configurada: {}",
                        rule_id,
                        service_id,
                        e
                    );
                    AppError::from(e)
                })
            })
            .collect()
    }

    pub async fn evaluate(&self, service_id: Uuid, at: DateTime<Utc>) -> AppResult<RuleEvaluation> {
        let rules = self.load_rules(service_id).await?;
        let evaluation = evaluate_rules(&rules, at, self.offset);
        log::debug!(
            "Reglas evaluadas para servicio {}: x{} / {} cargos fijos",
            service_id,
            evaluation.surge_multiplier,
            evaluation.fixed_charges.len()
        );
        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FareRuleRow, FareRuleType, HourRange, SurgeCondition, TimeBasedCondition};
    use crate::repositories::InMemoryServiceRepository;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    // 2024-01-15 es lunes
    fn monday_at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, hour, 30, 0).unwrap()
    }

    fn rule(name: &str, priority: i32, kind: FareRuleKind) -> FareRule {
        FareRule {
            id: Uuid::new_v4(),
            service_id: Uuid::nil(),
            name: name.to_string(),
            kind,
            priority,
            is_active: true,
            valid_from: None,
            valid_until: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn surge(
        name: &str,
        multiplier: Decimal,
        ranges: Vec<HourRange>,
        days: Option<Vec<u8>>,
    ) -> FareRule {
        rule(
            name,
            10,
            FareRuleKind::Surge {
                condition: SurgeCondition {
                    time_ranges: ranges,
                    days_of_week: days,
                },
                multiplier,
            },
        )
    }

    fn night(amount: Decimal) -> FareRule {
        rule(
            "Recargo nocturno",
            5,
            FareRuleKind::TimeBased {
                condition: TimeBasedCondition {
                    time_ranges: vec![HourRange::new(22, 6)],
                },
                amount,
            },
        )
    }

    #[test]
    fn test_overlapping_surges_take_maximum() {
        let rules = vec![
            surge("Pico", dec!(1.3), vec![HourRange::new(7, 10)], None),
            surge("Evento", dec!(1.5), vec![HourRange::new(8, 9)], None),
        ];
        let eval = evaluate_rules(&rules, monday_at(8), utc());
        assert_eq!(eval.surge_multiplier, dec!(1.5));
        assert_eq!(eval.applied_rules.len(), 2);
    }

    #[test]
    fn test_surge_respects_weekday_set() {
        let weekdays = surge(
            "Pico",
            dec!(1.3),
            vec![HourRange::new(7, 9)],
            Some(vec![1, 2, 3, 4, 5]),
        );
        let rules = vec![weekdays];

        assert_eq!(evaluate_rules(&rules, monday_at(8), utc()).surge_multiplier, dec!(1.3));

        let sunday = monday_at(8) - Duration::days(1);
        assert_eq!(evaluate_rules(&rules, sunday, utc()).surge_multiplier, Decimal::ONE);
    }

    #[test]
    fn test_time_based_charges_add_up() {
        let rules = vec![night(dec!(500)), night(dec!(200))];
        let eval = evaluate_rules(&rules, monday_at(23), utc());
        assert_eq!(eval.fixed_total(), dec!(700));
        assert_eq!(eval.surge_multiplier, Decimal::ONE);

        let eval = evaluate_rules(&rules, monday_at(12), utc());
        assert!(eval.fixed_charges.is_empty());
    }

    #[test]
    fn test_zone_based_and_discount_are_ignored() {
        let rules = vec![
            rule("Zona", 50, FareRuleKind::ZoneBased),
            rule("Promo", 50, FareRuleKind::Discount { amount: dec!(300) }),
        ];
        assert_eq!(evaluate_rules(&rules, monday_at(12), utc()), RuleEvaluation::default());
    }

    #[test]
    fn test_validity_window_and_inactive_rules_are_skipped() {
        let mut expired = night(dec!(500));
        expired.valid_until = Some(monday_at(23) - Duration::hours(1));
        let mut inactive = night(dec!(100));
        inactive.is_active = false;
        let mut future = night(dec!(50));
        future.valid_from = Some(monday_at(23) + Duration::hours(1));

        let eval = evaluate_rules(&[expired, inactive, future], monday_at(23), utc());
        assert!(eval.fixed_charges.is_empty());
    }

    #[test]
    fn test_order_is_priority_then_creation() {
        let mut late = night(dec!(1));
        late.name = "segunda".into();
        late.created_at = late.created_at + Duration::days(1);
        let mut early = night(dec!(2));
        early.name = "primera".into();
        let mut top = night(dec!(3));
        top.name = "prioritaria".into();
        top.priority = 99;

        let eval = evaluate_rules(&[late, early, top], monday_at(23), utc());
        assert_eq!(eval.applied_rules, vec!["prioritaria", "primera", "segunda"]);
    }

    #[test]
    fn test_local_offset_shifts_hour() {
        // 01:30 UTC = 22:30 en UTC-3
        let rules = vec![night(dec!(500))];
        let buenos_aires = FixedOffset::west_opt(3 * 3600).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 1, 16, 1, 30, 0).unwrap();
        assert_eq!(evaluate_rules(&rules, at, buenos_aires).fixed_total(), dec!(500));
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 15, 30, 0).unwrap();
        assert_eq!(evaluate_rules(&rules, at, buenos_aires).fixed_total(), dec!(0));
    }

    #[tokio::test]
    async fn test_engine_rejects_malformed_rules() {
        let service_id = Uuid::new_v4();
        let repo = InMemoryServiceRepository::new(
            vec![],
            vec![FareRuleRow {
                id: Uuid::new_v4(),
                service_id,
                name: "rota".into(),
                rule_type: FareRuleType::Surge,
                conditions: json!({"timeRanges": "siempre"}),
                multiplier: Some(dec!(1.2)),
                fixed_amount: None,
                priority: 1,
                is_active: true,
                valid_from: None,
                valid_until: None,
                created_at: Utc::now(),
            }],
        );
        let engine = FareRuleEngine::new(Arc::new(repo), utc());
        let result = engine.evaluate(service_id, Utc::now()).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
