#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use privatelimo_backend::{
    config::EnvironmentConfig,
    database::seed,
    models::{FareRuleRow, GeoPoint, RouteInfo, RouteSource},
    repositories::{InMemoryQuotationRepository, InMemoryServiceRepository, InMemoryZoneRepository},
    routes::create_router,
    services::{route_service::RouteError, RouteProvider, RouteService},
    state::{AppState, Repositories},
    utils::{
        clock::ManualClock,
        format::{distance_text, duration_text},
        jwt::{generate_token, UserRole},
    },
};

/// 5 km y 15 minutos para cualquier par de puntos
pub struct FixedRouteProvider;

#[async_trait]
impl RouteProvider for FixedRouteProvider {
    async fn route(&self, _: &GeoPoint, _: &GeoPoint) -> Result<RouteInfo, RouteError> {
        Ok(RouteInfo {
            distance_meters: 5000,
            duration_seconds: 900,
            distance_text: distance_text(5000),
            duration_text: duration_text(900),
            polyline: None,
            source: RouteSource::Provider,
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub services: Arc<InMemoryServiceRepository>,
    pub sedan_id: Uuid,
    pub config: EnvironmentConfig,
}

/// Martes 16/01/2024 15:00 en Buenos Aires (UTC-3)
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 16, 18, 0, 0).unwrap()
}

/// App en memoria con el catálogo de demostración
pub fn spawn_app() -> TestApp {
    let clock = Arc::new(ManualClock::new(start_time()));
    let catalog = seed::demo_catalog(start_time());
    let sedan_id = catalog.services[0].id;

    let services = Arc::new(InMemoryServiceRepository::new(
        catalog.services,
        catalog.rules,
    ));

    let repositories = Repositories {
        services: services.clone(),
        zones: Arc::new(InMemoryZoneRepository::new(catalog.zones)),
        quotations: Arc::new(InMemoryQuotationRepository::new()),
    };
    let routes = RouteService::new(
        Some(Arc::new(FixedRouteProvider)),
        Duration::from_secs(1),
        None,
    );

    let config = EnvironmentConfig {
        expiry_sweep_interval: None,
        ..EnvironmentConfig::default()
    };
    let state = AppState::new(config.clone(), repositories, routes, None, clock.clone());

    TestApp {
        router: create_router(state),
        clock,
        services,
        sedan_id,
        config,
    }
}

impl TestApp {
    pub async fn add_rule(&self, rule: FareRuleRow) {
        self.services.add_rule(rule).await;
    }

    pub fn token(&self, user_id: Uuid, role: UserRole) -> String {
        generate_token(user_id, role, &self.config.jwt_secret, 3600).unwrap()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }
}

/// Monto de un campo decimal serializado como texto
pub fn money(value: &Value) -> rust_decimal::Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}
