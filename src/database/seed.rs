//! Catálogo de demostración
//!
//! Tres niveles de servicio, las reglas de hora pico y nocturna del sedán y
//! dos zonas con recargo. Se usa para poblar el store en memoria y una base
//! vacía.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::models::{FareRuleRow, FareRuleType, GeoPoint, Service, Zone};

pub struct DemoCatalog {
    pub services: Vec<Service>,
    pub rules: Vec<FareRuleRow>,
    pub zones: Vec<Zone>,
}

#[allow(clippy::too_many_arguments)]
fn service(
    name: &str,
    slug: &str,
    description: &str,
    base: i64,
    per_km: i64,
    per_minute: i64,
    max_passengers: i32,
    max_luggage: i32,
    created_at: DateTime<Utc>,
) -> Service {
    Service {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: slug.to_string(),
        description: Some(description.to_string()),
        base_price: Decimal::from(base),
        price_per_km: Decimal::from(per_km),
        price_per_minute: Decimal::from(per_minute),
        minimum_distance_km: Decimal::from(2),
        minimum_duration_minutes: 10,
        max_passengers,
        max_luggage,
        is_active: true,
        created_at,
    }
}

#[allow(clippy::too_many_arguments)]
fn rule(
    service_id: Uuid,
    name: &str,
    rule_type: FareRuleType,
    conditions: serde_json::Value,
    multiplier: Option<Decimal>,
    fixed_amount: Option<Decimal>,
    priority: i32,
    created_at: DateTime<Utc>,
) -> FareRuleRow {
    FareRuleRow {
        id: Uuid::new_v4(),
        service_id,
        name: name.to_string(),
        rule_type,
        conditions,
        multiplier,
        fixed_amount,
        priority,
        is_active: true,
        valid_from: None,
        valid_until: None,
        created_at,
    }
}

fn rectangle(lat_a: f64, lat_b: f64, lng_a: f64, lng_b: f64) -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(lat_a, lng_a),
        GeoPoint::new(lat_a, lng_b),
        GeoPoint::new(lat_b, lng_b),
        GeoPoint::new(lat_b, lng_a),
    ]
}

fn zone(
    name: &str,
    slug: &str,
    polygon: Vec<GeoPoint>,
    percentage: Decimal,
    fixed: Decimal,
    created_at: DateTime<Utc>,
) -> Zone {
    Zone {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: slug.to_string(),
        polygon: Json(polygon),
        surcharge_percentage: percentage,
        surcharge_fixed: fixed,
        is_active: true,
        created_at,
        updated_at: created_at,
    }
}

/// Catálogo con marcas de tiempo anteriores a `now`. El primer servicio es el sedán.
pub fn demo_catalog(now: DateTime<Utc>) -> DemoCatalog {
    let t = |seconds: i64| now - Duration::days(1) + Duration::seconds(seconds);

    let services = vec![
        service(
            "Sedán Ejecutivo",
            "sedan-ejecutivo",
            "Mercedes-Benz Clase E o similar",
            2500,
            150,
            50,
            4,
            3,
            t(0),
        ),
        service(
            "SUV Premium",
            "suv-premium",
            "BMW X5 o similar",
            3500,
            200,
            70,
            6,
            4,
            t(1),
        ),
        service(
            "Van Ejecutiva",
            "van-ejecutiva",
            "Mercedes-Benz Sprinter o similar",
            5000,
            250,
            100,
            12,
            10,
            t(2),
        ),
    ];

    let sedan = services[0].id;
    let weekdays = json!([1, 2, 3, 4, 5]);
    let rules = vec![
        rule(
            sedan,
            "Hora pico matutina",
            FareRuleType::Surge,
            json!({"timeRanges": [{"start": 7, "end": 9}], "daysOfWeek": weekdays.clone()}),
            Some(Decimal::new(13, 1)),
            None,
            10,
            t(10),
        ),
        rule(
            sedan,
            "Hora pico vespertina",
            FareRuleType::Surge,
            json!({"timeRanges": [{"start": 17, "end": 20}], "daysOfWeek": weekdays}),
            Some(Decimal::new(13, 1)),
            None,
            10,
            t(11),
        ),
        rule(
            sedan,
            "Recargo nocturno",
            FareRuleType::TimeBased,
            json!({"timeRanges": [{"start": 22, "end": 24}, {"start": 0, "end": 6}]}),
            None,
            Some(Decimal::from(500)),
            5,
            t(12),
        ),
    ];

    let zones = vec![
        zone(
            "Aeropuerto Ezeiza",
            "aeropuerto-ezeiza",
            rectangle(-34.8222, -34.8022, -58.5358, -58.5158),
            Decimal::from(15),
            Decimal::from(800),
            t(20),
        ),
        zone(
            "Puerto Madero",
            "puerto-madero",
            rectangle(-34.6237, -34.6037, -58.3638, -58.3538),
            Decimal::from(10),
            Decimal::ZERO,
            t(21),
        ),
    ];

    DemoCatalog {
        services,
        rules,
        zones,
    }
}

/// Inserta el catálogo si la tabla de servicios está vacía
pub async fn seed_if_empty(pool: &PgPool, catalog: DemoCatalog) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(false);
    }

    let mut tx = pool.begin().await?;

    for s in &catalog.services {
        sqlx::query(
            r#"
            INSERT INTO services (id, name, slug, description, base_price, price_per_km,
                                  price_per_minute, minimum_distance_km, minimum_duration_minutes,
                                  max_passengers, max_luggage, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(s.id)
        .bind(&s.name)
        .bind(&s.slug)
        .bind(&s.description)
        .bind(s.base_price)
        .bind(s.price_per_km)
        .bind(s.price_per_minute)
        .bind(s.minimum_distance_km)
        .bind(s.minimum_duration_minutes)
        .bind(s.max_passengers)
        .bind(s.max_luggage)
        .bind(s.is_active)
        .bind(s.created_at)
        .execute(&mut *tx)
        .await?;
    }

    for r in &catalog.rules {
        sqlx::query(
            r#"
            INSERT INTO fare_rules (id, service_id, name, rule_type, conditions, multiplier,
                                    fixed_amount, priority, is_active, valid_from, valid_until,
                                    created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(r.id)
        .bind(r.service_id)
        .bind(&r.name)
        .bind(r.rule_type)
        .bind(&r.conditions)
        .bind(r.multiplier)
        .bind(r.fixed_amount)
        .bind(r.priority)
        .bind(r.is_active)
        .bind(r.valid_from)
        .bind(r.valid_until)
        .bind(r.created_at)
        .execute(&mut *tx)
        .await?;
    }

    for z in &catalog.zones {
        sqlx::query(
            r#"
            INSERT INTO zones (id, name, slug, polygon, surcharge_percentage, surcharge_fixed,
                               is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(z.id)
        .bind(&z.name)
        .bind(&z.slug)
        .bind(&z.polygon)
        .bind(z.surcharge_percentage)
        .bind(z.surcharge_fixed)
        .bind(z.is_active)
        .bind(z.created_at)
        .bind(z.updated_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(true)
}
