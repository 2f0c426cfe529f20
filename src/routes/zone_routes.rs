use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    controllers::ZoneController,
    dto::{
        api_response::ApiResponse,
        pagination::Paginated,
        zone_dto::{
            CreateZoneRequest, PointCheckResponse, PointQuery, UpdateZoneRequest,
            ZoneDeletedResponse, ZoneListQuery,
        },
    },
    middleware::{admin_only_middleware, auth_middleware},
    models::Zone,
    services::zone_service::PointSurcharge,
    state::AppState,
    utils::errors::AppError,
};

pub fn create_zone_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/geojson", get(geojson))
        .route("/check-point", get(check_point))
        .route("/surcharge", get(surcharge));

    // el último route_layer se ejecuta primero
    let admin = Router::new()
        .route("/", get(list_zones).post(create_zone))
        .route("/:id", get(get_zone).put(update_zone).delete(delete_zone))
        .route_layer(middleware::from_fn(admin_only_middleware))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(admin)
}

async fn geojson(State(state): State<AppState>) -> Result<Json<ApiResponse<Value>>, AppError> {
    let controller = ZoneController::new(&state);
    let response = controller.geojson().await?;
    Ok(Json(response))
}

async fn check_point(
    State(state): State<AppState>,
    Query(query): Query<PointQuery>,
) -> Result<Json<ApiResponse<PointCheckResponse>>, AppError> {
    let controller = ZoneController::new(&state);
    let response = controller.check_point(query).await?;
    Ok(Json(response))
}

async fn surcharge(
    State(state): State<AppState>,
    Query(query): Query<PointQuery>,
) -> Result<Json<ApiResponse<PointSurcharge>>, AppError> {
    let controller = ZoneController::new(&state);
    let response = controller.surcharge(query).await?;
    Ok(Json(response))
}

async fn list_zones(
    State(state): State<AppState>,
    Query(query): Query<ZoneListQuery>,
) -> Result<Json<ApiResponse<Paginated<Zone>>>, AppError> {
    let controller = ZoneController::new(&state);
    let response = controller.list(query).await?;
    Ok(Json(response))
}

async fn create_zone(
    State(state): State<AppState>,
    Json(request): Json<CreateZoneRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Zone>>), AppError> {
    let controller = ZoneController::new(&state);
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_zone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Zone>>, AppError> {
    let controller = ZoneController::new(&state);
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn update_zone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateZoneRequest>,
) -> Result<Json<ApiResponse<Zone>>, AppError> {
    let controller = ZoneController::new(&state);
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn delete_zone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ZoneDeletedResponse>>, AppError> {
    let controller = ZoneController::new(&state);
    let response = controller.delete(id).await?;
    Ok(Json(response))
}
