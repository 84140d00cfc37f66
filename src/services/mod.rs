pub mod auth_service;
pub mod import_service;
pub mod route_service;
pub mod zone_service;
