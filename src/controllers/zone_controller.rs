use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        api_response::ApiResponse,
        pagination::Paginated,
        zone_dto::{
            CreateZoneRequest, PointCheckResponse, PointQuery, UpdateZoneRequest,
            ZoneDeletedResponse, ZoneListQuery,
        },
    },
    models::{GeoPoint, Zone},
    services::{
        zone_service::{PointSurcharge, ZoneSummary},
        ZoneService,
    },
    state::AppState,
    utils::errors::AppError,
};

pub struct ZoneController {
    zones: Arc<ZoneService>,
}

impl ZoneController {
    pub fn new(state: &AppState) -> Self {
        Self {
            zones: state.zones.clone(),
        }
    }

    fn point(query: &PointQuery) -> Result<GeoPoint, AppError> {
        query.validate()?;
        Ok(GeoPoint::new(query.lat, query.lng))
    }

    pub async fn geojson(&self) -> Result<ApiResponse<Value>, AppError> {
        let collection = self.zones.geojson().await?;
        Ok(ApiResponse::success(collection))
    }

    pub async fn check_point(
        &self,
        query: PointQuery,
    ) -> Result<ApiResponse<PointCheckResponse>, AppError> {
        let point = Self::point(&query)?;
        let zone = self.zones.check_point(&point).await?;
        Ok(ApiResponse::success(PointCheckResponse {
            in_zone: zone.is_some(),
            zone: zone.as_ref().map(ZoneSummary::from),
        }))
    }

    pub async fn surcharge(
        &self,
        query: PointQuery,
    ) -> Result<ApiResponse<PointSurcharge>, AppError> {
        let point = Self::point(&query)?;
        let surcharge = self.zones.resolve_surcharge(&point).await?;
        Ok(ApiResponse::success(surcharge))
    }

    pub async fn list(
        &self,
        query: ZoneListQuery,
    ) -> Result<ApiResponse<Paginated<Zone>>, AppError> {
        let page = self.zones.list(query).await?;
        Ok(ApiResponse::success(page))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ApiResponse<Zone>, AppError> {
        let zone = self.zones.get(id).await?;
        Ok(ApiResponse::success(zone))
    }

    pub async fn create(&self, request: CreateZoneRequest) -> Result<ApiResponse<Zone>, AppError> {
        let zone = self.zones.create(request).await?;
        Ok(ApiResponse::success_with_message(
            zone,
            "Zona creada exitosamente",
        ))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateZoneRequest,
    ) -> Result<ApiResponse<Zone>, AppError> {
        let zone = self.zones.update(id, request).await?;
        Ok(ApiResponse::success_with_message(
            zone,
            "Zona actualizada exitosamente",
        ))
    }

    pub async fn delete(&self, id: Uuid) -> Result<ApiResponse<ZoneDeletedResponse>, AppError> {
        let zone = self.zones.deactivate(id).await?;
        Ok(ApiResponse::success_with_message(
            ZoneDeletedResponse::from(&zone),
            "Zona desactivada exitosamente",
        ))
    }
}
