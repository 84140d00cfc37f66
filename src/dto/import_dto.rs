use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::client::Client;
use crate::models::import_file::ImportFileSummary;
use crate::services::import_service::ImportOutcome;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportResponse {
    pub message: String,
    pub import_id: i32,
    pub filename: String,
    pub accepted_rows: usize,
    pub rejected_rows: usize,
    pub total_rows: usize,
}

impl From<ImportOutcome> for ImportResponse {
    fn from(value: ImportOutcome) -> Self {
        Self {
            message: format!(
                "File {} imported: {} of {} rows accepted.",
                value.import_file.filename, value.accepted_rows, value.total_rows
            ),
            import_id: value.import_file.id,
            filename: value.import_file.filename,
            accepted_rows: value.accepted_rows,
            rejected_rows: value.total_rows - value.accepted_rows,
            total_rows: value.total_rows,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportFileResponse {
    pub id: i32,
    pub filename: String,
    pub import_date: DateTime<Utc>,
    pub client_count: i64,
}

impl From<ImportFileSummary> for ImportFileResponse {
    fn from(value: ImportFileSummary) -> Self {
        Self {
            id: value.id,
            filename: value.filename,
            import_date: value.import_date,
            client_count: value.client_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportDetailResponse {
    pub id: i32,
    pub filename: String,
    pub import_date: DateTime<Utc>,
    pub client_count: i64,
    pub clients: Vec<ClientResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientResponse {
    pub id: i32,
    pub client_id: i64,
    pub nom: String,
    pub prenom: String,
    pub telephone: String,
    pub reseaux_social: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Client> for ClientResponse {
    fn from(value: Client) -> Self {
        Self {
            id: value.id,
            client_id: value.client_id,
            nom: value.nom,
            prenom: value.prenom,
            telephone: value.telephone,
            reseaux_social: value.reseaux_social,
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TotalClientsResponse {
    pub total_clients: i64,
}

/// Map marker for one client; `id` is the identifier from the uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientCoordinate {
    pub id: i64,
    pub nom: String,
    pub prenom: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Client> for ClientCoordinate {
    fn from(value: Client) -> Self {
        Self {
            id: value.client_id,
            nom: value.nom,
            prenom: value.prenom,
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientCoordinatesResponse {
    pub coordinates: Vec<ClientCoordinate>,
}
