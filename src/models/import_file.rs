use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ImportFile {
    pub id: i32,
    pub filename: String,
    pub import_date: DateTime<Utc>,
}

/// An import batch annotated with the number of clients it currently owns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ImportFileSummary {
    pub id: i32,
    pub filename: String,
    pub import_date: DateTime<Utc>,
    pub client_count: i64,
}
