pub mod auth_dto;
pub mod import_dto;
pub mod route_dto;
pub mod zone_dto;
