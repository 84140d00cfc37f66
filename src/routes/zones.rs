use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::auth_dto::{MessageResponse, PaginationQuery},
    dto::zone_dto::{DeletedResponse, ZoneGroupQuery, ZonePayload, ZoneResponse},
    error::{Error, Result},
    utils::extract::{ApiJson, ApiPath, ApiQuery},
    utils::validation::validate_all,
    AppState,
};

fn zone_not_found(id: i32) -> Error {
    Error::NotFound(format!("Zone {} not found", id))
}

#[utoipa::path(
    post,
    path = "/zones",
    request_body = Vec<ZonePayload>,
    responses(
        (status = 201, description = "Groups replaced by the submitted points", body = [ZoneResponse]),
        (status = 400, description = "Invalid entry or unknown salesperson email")
    ),
    security(("admin_basic" = []))
)]
#[axum::debug_handler]
pub async fn create_zone_assignments(
    State(state): State<AppState>,
    ApiJson(entries): ApiJson<Vec<ZonePayload>>,
) -> Result<impl IntoResponse> {
    validate_all(&entries)?;
    let zones = state.zone_service.assign(&entries).await?;
    let items: Vec<ZoneResponse> = zones.into_iter().map(Into::into).collect();
    Ok((StatusCode::CREATED, Json(items)))
}

#[utoipa::path(
    get,
    path = "/zones",
    params(
        ("skip" = Option<i64>, Query, description = "Rows to skip"),
        ("limit" = Option<i64>, Query, description = "Maximum rows to return")
    ),
    responses((status = 200, description = "Zone points", body = [ZoneResponse])),
    security(("bearer" = []), ("admin_basic" = []))
)]
#[axum::debug_handler]
pub async fn list_zones(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PaginationQuery>,
) -> Result<impl IntoResponse> {
    let zones = state
        .zone_service
        .list(query.offset(), query.limit())
        .await?;
    let items: Vec<ZoneResponse> = zones.into_iter().map(Into::into).collect();
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/zones/{id}",
    params(("id" = i32, Path, description = "Zone point ID")),
    responses(
        (status = 200, description = "Zone point", body = ZoneResponse),
        (status = 404, description = "Zone not found")
    ),
    security(("bearer" = []), ("admin_basic" = []))
)]
#[axum::debug_handler]
pub async fn get_zone(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<impl IntoResponse> {
    let zone = state
        .zone_service
        .get(id)
        .await?
        .ok_or_else(|| zone_not_found(id))?;
    Ok(Json(ZoneResponse::from(zone)))
}

#[utoipa::path(
    get,
    path = "/zones/user/{email}",
    params(("email" = String, Path, description = "Salesperson email")),
    responses((status = 200, description = "Zone points owned by the salesperson", body = [ZoneResponse])),
    security(("bearer" = []), ("admin_basic" = []))
)]
#[axum::debug_handler]
pub async fn list_user_zones(
    State(state): State<AppState>,
    ApiPath(email): ApiPath<String>,
) -> Result<impl IntoResponse> {
    let zones = state.zone_service.list_by_owner(&email).await?;
    let items: Vec<ZoneResponse> = zones.into_iter().map(Into::into).collect();
    Ok(Json(items))
}

#[utoipa::path(
    put,
    path = "/zones/{id}",
    params(("id" = i32, Path, description = "Zone point ID")),
    request_body = ZonePayload,
    responses(
        (status = 200, description = "Zone point replaced", body = ZoneResponse),
        (status = 400, description = "Invalid payload or unknown salesperson email"),
        (status = 404, description = "Zone not found")
    ),
    security(("admin_basic" = []))
)]
#[axum::debug_handler]
pub async fn update_zone(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<ZonePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let zone = state
        .zone_service
        .update(id, &payload)
        .await?
        .ok_or_else(|| zone_not_found(id))?;
    Ok(Json(ZoneResponse::from(zone)))
}

#[utoipa::path(
    delete,
    path = "/zones/{id}",
    params(("id" = i32, Path, description = "Zone point ID")),
    responses(
        (status = 200, description = "Zone point deleted", body = MessageResponse),
        (status = 404, description = "Zone not found")
    ),
    security(("admin_basic" = []))
)]
#[axum::debug_handler]
pub async fn delete_zone(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<impl IntoResponse> {
    if !state.zone_service.delete(id).await? {
        return Err(zone_not_found(id));
    }
    Ok(Json(MessageResponse::new("Zone deleted.")))
}

#[utoipa::path(
    delete,
    path = "/zones/group",
    params(
        ("name" = String, Query, description = "Zone name"),
        ("email" = String, Query, description = "Salesperson email")
    ),
    responses((status = 200, description = "Every point of the group deleted", body = DeletedResponse)),
    security(("admin_basic" = []))
)]
#[axum::debug_handler]
pub async fn delete_zone_group(
    State(state): State<AppState>,
    ApiQuery(group): ApiQuery<ZoneGroupQuery>,
) -> Result<impl IntoResponse> {
    let deleted = state
        .zone_service
        .delete_group(&group.name, &group.email)
        .await?;
    Ok(Json(DeletedResponse {
        message: format!("Zone {} of {} deleted.", group.name, group.email),
        deleted,
    }))
}

#[utoipa::path(
    delete,
    path = "/zones",
    responses((status = 200, description = "Every zone point deleted", body = DeletedResponse)),
    security(("admin_basic" = []))
)]
#[axum::debug_handler]
pub async fn delete_all_zones(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let deleted = state.zone_service.delete_all().await?;
    Ok(Json(DeletedResponse {
        message: "All zones deleted.".to_string(),
        deleted,
    }))
}
