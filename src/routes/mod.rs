pub mod auth;
pub mod docs;
pub mod health;
pub mod imports;
pub mod routing;
pub mod zones;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};

use crate::middleware::auth::{require_admin, require_bearer_auth, require_user_or_admin};
use crate::AppState;

/// Full HTTP surface. Each sub-router carries its own guard as a route layer,
/// so unmatched paths still fall through to a plain 404.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let admin = Router::new()
        .route("/admin/users", get(auth::list_users))
        .route("/upload-csv", post(imports::upload_csv))
        .route("/imports", get(imports::list_imports))
        .route(
            "/imports/:id",
            get(imports::get_import).delete(imports::delete_import),
        )
        .route("/total-clients", post(imports::total_clients))
        .route("/clients-coordinates", post(imports::clients_coordinates))
        .route(
            "/zones",
            post(zones::create_zone_assignments).delete(zones::delete_all_zones),
        )
        .route("/zones/group", delete(zones::delete_zone_group))
        .route(
            "/zones/:id",
            put(zones::update_zone).delete(zones::delete_zone),
        )
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    let zone_readers = Router::new()
        .route("/zones", get(zones::list_zones))
        .route("/zones/:id", get(zones::get_zone))
        .route("/zones/user/:email", get(zones::list_user_zones))
        .route_layer(from_fn_with_state(state.clone(), require_user_or_admin));

    let session = Router::new()
        .route("/calculate-best-route", post(routing::calculate_best_route))
        .route_layer(from_fn_with_state(state.clone(), require_bearer_auth));

    let max_upload_bytes = state.config.max_upload_bytes;

    public
        .merge(admin)
        .merge(zone_readers)
        .merge(session)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
