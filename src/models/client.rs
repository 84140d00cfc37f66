use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: i32,
    pub client_id: i64,
    pub nom: String,
    pub prenom: String,
    pub telephone: String,
    pub reseaux_social: String,
    pub latitude: f64,
    pub longitude: f64,
    pub import_file_id: i32,
}

/// A client row parsed from an upload, before it is attached to a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClient {
    pub client_id: i64,
    pub nom: String,
    pub prenom: String,
    pub telephone: String,
    pub reseaux_social: String,
    pub latitude: f64,
    pub longitude: f64,
}
