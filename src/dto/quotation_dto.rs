use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{GeoPoint, PriceLine, Quotation, ServiceSummary, TripZoneNames};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuotationRequest {
    pub service_id: Uuid,

    #[validate(
        length(min = 1, max = 500),
        custom = "crate::utils::validation::validate_not_blank"
    )]
    pub pickup_address: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub pickup_lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub pickup_lng: f64,

    #[validate(
        length(min = 1, max = 500),
        custom = "crate::utils::validation::validate_not_blank"
    )]
    pub dropoff_address: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub dropoff_lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub dropoff_lng: f64,

    pub requested_date: DateTime<Utc>,

    #[validate(range(min = 1, max = 50))]
    pub passenger_count: i32,

    #[validate(length(max = 1000))]
    pub special_requirements: Option<String>,
}

impl CreateQuotationRequest {
    pub fn pickup(&self) -> GeoPoint {
        GeoPoint::new(self.pickup_lat, self.pickup_lng)
    }

    pub fn dropoff(&self) -> GeoPoint {
        GeoPoint::new(self.dropoff_lat, self.dropoff_lng)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuickQuoteQuery {
    pub service_id: Uuid,

    #[validate(range(min = -90.0, max = 90.0))]
    pub pickup_lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub pickup_lng: f64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub dropoff_lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub dropoff_lng: f64,
}

impl QuickQuoteQuery {
    pub fn pickup(&self) -> GeoPoint {
        GeoPoint::new(self.pickup_lat, self.pickup_lng)
    }

    pub fn dropoff(&self) -> GeoPoint {
        GeoPoint::new(self.dropoff_lat, self.dropoff_lng)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EstimateQuery {
    pub service_id: Uuid,

    #[validate(custom = "crate::utils::validation::validate_trip_distance")]
    pub distance_km: Decimal,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Cotización con los campos derivados que espera el frontend
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationResponse {
    #[serde(flatten)]
    pub quotation: Quotation,
    pub service: Option<ServiceSummary>,
    pub formatted_price: String,
    pub expires_in: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickQuoteRoute {
    pub distance: String,
    pub duration: String,
    pub distance_km: Decimal,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickQuotePricing {
    pub total_price: Decimal,
    pub formatted_price: String,
    pub surge_active: bool,
    pub surge_multiplier: Decimal,
    pub breakdown: Vec<PriceLine>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickQuoteResponse {
    pub service: ServiceSummary,
    pub route: QuickQuoteRoute,
    pub pricing: QuickQuotePricing,
    pub zones: TripZoneNames,
    pub valid_for: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEstimate {
    pub service: ServiceSummary,
    pub estimated_minutes: i32,
    pub price_range: PriceRange,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppMessage {
    pub message: String,
    pub phone_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_request() -> serde_json::Value {
        json!({
            "serviceId": Uuid::new_v4(),
            "pickupAddress": "Av. Corrientes 1234",
            "pickupLat": -34.6037,
            "pickupLng": -58.3816,
            "dropoffAddress": "Aeropuerto Ezeiza",
            "dropoffLat": -34.8122,
            "dropoffLng": -58.5258,
            "requestedDate": "2030-01-01T10:00:00Z",
            "passengerCount": 2
        })
    }

    #[test]
    fn test_create_request_validation() {
        let req: CreateQuotationRequest = serde_json::from_value(valid_request()).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.dropoff(), GeoPoint::new(-34.8122, -58.5258));

        let mut body = valid_request();
        body["pickupLat"] = json!(-91.0);
        let req: CreateQuotationRequest = serde_json::from_value(body).unwrap();
        assert!(req.validate().is_err());

        let mut body = valid_request();
        body["passengerCount"] = json!(0);
        let req: CreateQuotationRequest = serde_json::from_value(body).unwrap();
        assert!(req.validate().is_err());

        let mut body = valid_request();
        body["pickupAddress"] = json!("   ");
        let req: CreateQuotationRequest = serde_json::from_value(body).unwrap();
        assert!(req.validate().is_err());
    }
}
