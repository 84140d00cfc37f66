pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    auth_service::AuthService, import_service::ImportService, route_service::RouteService,
    zone_service::ZoneService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub import_service: ImportService,
    pub zone_service: ZoneService,
    pub route_service: RouteService,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Result<Self> {
        let auth_service = AuthService::new(pool.clone(), &config);
        let import_service = ImportService::new(pool.clone());
        let zone_service = ZoneService::new(pool.clone());
        let route_service = RouteService::new(&config)?;

        Ok(Self {
            pool,
            config: Arc::new(config),
            auth_service,
            import_service,
            zone_service,
            route_service,
        })
    }
}
