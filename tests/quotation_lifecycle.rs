mod common;

use axum::http::StatusCode;
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{money, spawn_app, start_time, TestApp};
use privatelimo_backend::{
    models::{FareRuleRow, FareRuleType},
    utils::jwt::UserRole,
};

/// Fuera de toda zona del catálogo de demostración
fn trip_body(app: &TestApp, requested: chrono::DateTime<Utc>) -> Value {
    json!({
        "serviceId": app.sedan_id,
        "pickupAddress": "Av. Santa Fe 3200",
        "pickupLat": -34.5880,
        "pickupLng": -58.4100,
        "dropoffAddress": "Av. Cabildo 2000",
        "dropoffLat": -34.5620,
        "dropoffLng": -58.4560,
        "requestedDate": requested.to_rfc3339(),
        "passengerCount": 2
    })
}

async fn create(app: &TestApp, token: Option<&str>, body: Value) -> Value {
    let (status, response) = app.post("/quotations", token, body).await;
    assert_eq!(status, StatusCode::CREATED, "{}", response);
    response["data"].clone()
}

fn surge_rule(service_id: Uuid, name: &str, multiplier: Decimal) -> FareRuleRow {
    FareRuleRow {
        id: Uuid::new_v4(),
        service_id,
        name: name.to_string(),
        rule_type: FareRuleType::Surge,
        conditions: json!({"timeRanges": [{"start": 7, "end": 9}], "daysOfWeek": [1, 2, 3, 4, 5]}),
        multiplier: Some(multiplier),
        fixed_amount: None,
        priority: 1,
        is_active: true,
        valid_from: None,
        valid_until: None,
        created_at: start_time(),
    }
}

#[tokio::test]
async fn test_worked_price_example() {
    // 2500 + 5 km x 150 + 15 min x 50, sin reglas ni zonas
    let app = spawn_app();
    let data = create(&app, None, trip_body(&app, start_time() + Duration::hours(1))).await;

    assert_eq!(data["status"], "PENDING");
    assert_eq!(money(&data["basePrice"]), dec!(2500));
    assert_eq!(money(&data["distancePrice"]), dec!(750));
    assert_eq!(money(&data["timePrice"]), dec!(750));
    assert_eq!(money(&data["surgePrice"]), dec!(0));
    assert_eq!(money(&data["zonesSurcharge"]), dec!(0));
    assert_eq!(money(&data["totalPrice"]), dec!(4000));
    assert_eq!(data["formattedPrice"], "$ 4.000,00");
    assert_eq!(data["expiresIn"], "30 minutos");
    assert_eq!(data["service"]["name"], "Sedán Ejecutivo");
    assert_eq!(data["priceBreakdown"]["route"]["source"], "provider");
    assert!(data["userId"].is_null());

    let items = data["priceBreakdown"]["pricing"]["items"].as_array().unwrap();
    assert_eq!(items[0]["description"], "Tarifa base");
    let total: Decimal = items.iter().map(|i| money(&i["amount"])).sum();
    assert_eq!(total, dec!(4000));
}

#[tokio::test]
async fn test_overlapping_surges_take_the_highest_multiplier() {
    let app = spawn_app();
    // el catálogo ya trae "Hora pico matutina" x1.3 en la misma franja
    app.add_rule(surge_rule(app.sedan_id, "Evento especial", dec!(1.5)))
        .await;

    // lunes 22/01/2024 08:00 en Buenos Aires
    let monday_rush = Utc.with_ymd_and_hms(2024, 1, 22, 11, 0, 0).unwrap();
    let data = create(&app, None, trip_body(&app, monday_rush)).await;
    let pricing = &data["priceBreakdown"]["pricing"];

    assert_eq!(money(&pricing["surgeMultiplier"]), dec!(1.5));
    assert_eq!(money(&data["surgePrice"]), dec!(2000));
    assert_eq!(money(&data["totalPrice"]), dec!(6000));
    let applied: Vec<&str> = pricing["appliedRules"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(applied.contains(&"Tarifa dinámica: Evento especial"));
    assert!(applied.contains(&"Tarifa dinámica: Hora pico matutina"));
}

#[tokio::test]
async fn test_zone_percentages_take_max_and_fixed_amounts_add_up() {
    let app = spawn_app();
    let admin = app.token(Uuid::new_v4(), UserRole::Admin);

    for (slug, lat_a, lat_b, lng_a, lng_b, percentage, fixed) in [
        ("origen", -34.60, -34.58, -58.42, -58.40, 10, 500),
        ("destino", -34.57, -34.55, -58.47, -58.44, 15, 300),
    ] {
        let (status, body) = app
            .post(
                "/zones",
                Some(&admin),
                json!({
                    "name": format!("Zona {}", slug),
                    "slug": slug,
                    "polygon": [
                        {"lat": lat_a, "lng": lng_a},
                        {"lat": lat_a, "lng": lng_b},
                        {"lat": lat_b, "lng": lng_b},
                        {"lat": lat_b, "lng": lng_a}
                    ],
                    "surchargePercentage": percentage,
                    "surchargeFixed": fixed
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
    }

    let data = create(&app, None, trip_body(&app, start_time() + Duration::hours(1))).await;
    let pricing = &data["priceBreakdown"]["pricing"];

    assert_eq!(money(&pricing["zonePercentage"]), dec!(15));
    // 4000 x 15% + (500 + 300)
    assert_eq!(money(&data["zonesSurcharge"]), dec!(1400));
    assert_eq!(money(&data["totalPrice"]), dec!(5400));
    assert_eq!(data["priceBreakdown"]["zones"]["pickup"], "Zona origen");
    assert_eq!(data["priceBreakdown"]["zones"]["dropoff"], "Zona destino");
}

#[tokio::test]
async fn test_create_validation_errors() {
    let app = spawn_app();

    let past = trip_body(&app, start_time() - Duration::minutes(5));
    let (status, body) = app.post("/quotations", None, past).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["requestedDate"].is_array());

    let mut crowded = trip_body(&app, start_time() + Duration::hours(1));
    crowded["passengerCount"] = json!(5);
    let (status, body) = app.post("/quotations", None, crowded).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["passengerCount"].is_array());

    let mut unknown = trip_body(&app, start_time() + Duration::hours(1));
    unknown["serviceId"] = json!(Uuid::new_v4());
    let (status, _) = app.post("/quotations", None, unknown).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .get(&format!("/quotations/{}", Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_quotation_expires_after_ttl_and_cannot_be_accepted() {
    let app = spawn_app();
    let data = create(&app, None, trip_body(&app, start_time() + Duration::hours(2))).await;
    let id = data["id"].as_str().unwrap().to_string();

    app.clock.advance(Duration::minutes(29));
    let (_, body) = app.get(&format!("/quotations/{}", id), None).await;
    assert_eq!(body["data"]["status"], "PENDING");
    assert_eq!(body["data"]["expiresIn"], "1 minutos");

    app.clock.advance(Duration::minutes(2));
    let (status, body) = app.get(&format!("/quotations/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "EXPIRED");
    assert_eq!(body["data"]["expiresIn"], "Expirada");

    let (status, body) = app
        .post(&format!("/quotations/{}/accept", id), None, json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_accept_after_ttl_without_prior_read_is_conflict() {
    let app = spawn_app();
    let data = create(&app, None, trip_body(&app, start_time() + Duration::hours(2))).await;
    let id = data["id"].as_str().unwrap().to_string();

    app.clock.advance(Duration::minutes(31));
    let (status, _) = app
        .post(&format!("/quotations/{}/accept", id), None, json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = app.get(&format!("/quotations/{}", id), None).await;
    assert_eq!(body["data"]["status"], "EXPIRED");
}

#[tokio::test]
async fn test_concurrent_accepts_have_a_single_winner() {
    let app = spawn_app();
    let data = create(&app, None, trip_body(&app, start_time() + Duration::hours(2))).await;
    let uri = format!("/quotations/{}/accept", data["id"].as_str().unwrap());

    let (first, second) = tokio::join!(
        app.post(&uri, None, json!({})),
        app.post(&uri, None, json!({}))
    );
    let mut statuses = vec![first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);

    let (_, body) = app
        .get(&format!("/quotations/{}", data["id"].as_str().unwrap()), None)
        .await;
    assert_eq!(body["data"]["status"], "ACCEPTED");
    assert!(body["data"]["acceptedAt"].is_string());
}

#[tokio::test]
async fn test_owner_checks_on_accept() {
    let app = spawn_app();
    let owner = Uuid::new_v4();
    let owner_token = app.token(owner, UserRole::Customer);
    let stranger_token = app.token(Uuid::new_v4(), UserRole::Customer);

    let data = create(
        &app,
        Some(&owner_token),
        trip_body(&app, start_time() + Duration::hours(2)),
    )
    .await;
    assert_eq!(data["userId"], owner.to_string());
    let uri = format!("/quotations/{}/accept", data["id"].as_str().unwrap());

    let (status, body) = app.post(&uri, Some(&stranger_token), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, body) = app.post(&uri, Some(&owner_token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ACCEPTED");

    // aceptada es terminal: el vencimiento ya no la afecta
    app.clock.advance(Duration::hours(1));
    let (_, body) = app
        .get(&format!("/quotations/{}", data["id"].as_str().unwrap()), None)
        .await;
    assert_eq!(body["data"]["status"], "ACCEPTED");
}

#[tokio::test]
async fn test_list_user_quotations() {
    let app = spawn_app();
    let user = Uuid::new_v4();
    let token = app.token(user, UserRole::Customer);
    let requested = start_time() + Duration::hours(3);

    for _ in 0..3 {
        create(&app, Some(&token), trip_body(&app, requested)).await;
        app.clock.advance(Duration::minutes(1));
    }
    create(&app, None, trip_body(&app, requested)).await;

    let (status, _) = app.get("/quotations/user/quotations", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .get("/quotations/user/quotations?page=1&limit=2", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    let page = &body["data"];
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["pagination"]["total"], 3);
    assert_eq!(page["pagination"]["totalPages"], 2);

    // más reciente primero
    let first = page["items"][0]["createdAt"].as_str().unwrap();
    let second = page["items"][1]["createdAt"].as_str().unwrap();
    assert!(first > second);

    let (status, _) = app
        .get("/quotations/user/quotations", Some("garbage"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_whatsapp_message() {
    let app = spawn_app();
    let data = create(&app, None, trip_body(&app, start_time() + Duration::hours(1))).await;

    let (status, body) = app
        .get(
            &format!("/quotations/{}/whatsapp", data["id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["phoneNumber"], "+1234567890");
    let message = body["data"]["message"].as_str().unwrap();
    assert!(message.contains("Desde: Av. Santa Fe 3200"));
    assert!(message.contains("Hasta: Av. Cabildo 2000"));
    assert!(message.contains("$ 4.000,00"));
    assert!(message.contains("16/01/2024 16:00"));
    assert!(message.contains("30 minutos"));
}
