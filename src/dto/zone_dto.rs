use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::zone::Zone;

/// One assignment point. Also the full replacement body of `PUT /zones/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ZonePayload {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ZoneResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Zone> for ZoneResponse {
    fn from(value: Zone) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZoneGroupQuery {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    pub message: String,
    pub deleted: u64,
}
