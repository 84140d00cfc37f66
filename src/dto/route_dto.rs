use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::services::route_service::RouteResult;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct LatLngPoint {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RouteResponse {
    pub route_points: Vec<LatLngPoint>,
    pub distance_km: f64,
    pub duration_str: String,
}

impl From<RouteResult> for RouteResponse {
    fn from(value: RouteResult) -> Self {
        Self {
            route_points: value.route_points,
            distance_km: value.distance_km,
            duration_str: value.duration_str,
        }
    }
}
