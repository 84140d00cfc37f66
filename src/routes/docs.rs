use axum::response::Json;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::dto::{
    auth_dto::{LoginForm, MessageResponse, RegisterPayload, TokenResponse, UserResponse},
    import_dto::{
        ClientCoordinate, ClientCoordinatesResponse, ClientResponse, ImportDetailResponse,
        ImportFileResponse, ImportResponse, TotalClientsResponse,
    },
    route_dto::{LatLngPoint, RouteResponse},
    zone_dto::{DeletedResponse, ZonePayload, ZoneResponse},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "admin_basic",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Sales zones API"),
    paths(
        super::health::health,
        super::auth::register,
        super::auth::login,
        super::auth::list_users,
        super::imports::upload_csv,
        super::imports::list_imports,
        super::imports::get_import,
        super::imports::delete_import,
        super::imports::total_clients,
        super::imports::clients_coordinates,
        super::zones::create_zone_assignments,
        super::zones::list_zones,
        super::zones::get_zone,
        super::zones::list_user_zones,
        super::zones::update_zone,
        super::zones::delete_zone,
        super::zones::delete_zone_group,
        super::zones::delete_all_zones,
        super::routing::calculate_best_route,
    ),
    components(schemas(
        RegisterPayload,
        LoginForm,
        TokenResponse,
        UserResponse,
        MessageResponse,
        ImportResponse,
        ImportFileResponse,
        ImportDetailResponse,
        ClientResponse,
        TotalClientsResponse,
        ClientCoordinate,
        ClientCoordinatesResponse,
        ZonePayload,
        ZoneResponse,
        DeletedResponse,
        LatLngPoint,
        RouteResponse,
    )),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
