//! Rutas HTTP
//!
//! `/quotations` y `/zones`, más `/health`.

pub mod quotation_routes;
pub mod zone_routes;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::{middleware::cors_layer, state::AppState};

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health))
        .nest(
            "/quotations",
            quotation_routes::create_quotation_router(state.clone()),
        )
        .nest("/zones", zone_routes::create_zone_router(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
