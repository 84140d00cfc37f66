use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::route_dto::{LatLngPoint, RouteResponse},
    error::Result,
    utils::{extract::ApiJson, token::Claims, validation::validate_all},
    AppState,
};

#[utoipa::path(
    post,
    path = "/calculate-best-route",
    request_body = Vec<LatLngPoint>,
    responses(
        (status = 200, description = "Fastest route through the points", body = RouteResponse),
        (status = 400, description = "Fewer than two points or invalid coordinates"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Provider found no route"),
        (status = 502, description = "Routing provider failure")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn calculate_best_route(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(points): ApiJson<Vec<LatLngPoint>>,
) -> Result<impl IntoResponse> {
    validate_all(&points)?;
    tracing::info!(user = %claims.sub, points = points.len(), "route requested");
    let route = state.route_service.best_route(&points).await?;
    Ok(Json(RouteResponse::from(route)))
}
