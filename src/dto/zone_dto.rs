use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{models::Zone, services::zone_service::ZoneSummary};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateZoneRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(
        length(min = 2, max = 100),
        regex = "crate::utils::validation::SLUG_REGEX"
    )]
    pub slug: String,

    #[validate(custom = "crate::utils::validation::validate_polygon")]
    pub polygon: Vec<crate::models::GeoPoint>,

    #[validate(custom = "crate::utils::validation::validate_percentage")]
    pub surcharge_percentage: Option<Decimal>,

    #[validate(custom = "crate::utils::validation::validate_non_negative")]
    pub surcharge_fixed: Option<Decimal>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateZoneRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,

    #[validate(
        length(min = 2, max = 100),
        regex = "crate::utils::validation::SLUG_REGEX"
    )]
    pub slug: Option<String>,

    #[validate(custom = "crate::utils::validation::validate_polygon")]
    pub polygon: Option<Vec<crate::models::GeoPoint>>,

    #[validate(custom = "crate::utils::validation::validate_percentage")]
    pub surcharge_percentage: Option<Decimal>,

    #[validate(custom = "crate::utils::validation::validate_non_negative")]
    pub surcharge_fixed: Option<Decimal>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneListQuery {
    pub is_active: Option<bool>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct PointQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointCheckResponse {
    pub in_zone: bool,
    pub zone: Option<ZoneSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDeletedResponse {
    pub id: Uuid,
    pub is_active: bool,
}

impl From<&Zone> for ZoneDeletedResponse {
    fn from(zone: &Zone) -> Self {
        Self {
            id: zone.id,
            is_active: zone.is_active,
        }
    }
}
