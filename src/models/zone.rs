use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Zone {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub latitude: f64,
    pub longitude: f64,
}
