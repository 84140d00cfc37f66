use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::auth_dto::MessageResponse,
    dto::import_dto::{
        ClientCoordinate, ClientCoordinatesResponse, ClientResponse, ImportDetailResponse,
        ImportFileResponse, ImportResponse, TotalClientsResponse,
    },
    error::{Error, Result},
    middleware::auth::AdminIdentity,
    utils::extract::{ApiJson, ApiPath},
    AppState,
};

#[utoipa::path(
    post,
    path = "/upload-csv",
    request_body(content = String, content_type = "multipart/form-data", description = "CSV file in the `file` field"),
    responses(
        (status = 201, description = "Batch imported", body = ImportResponse),
        (status = 400, description = "Missing columns or unreadable upload"),
        (status = 409, description = "A batch with this filename already exists")
    ),
    security(("admin_basic" = []))
)]
#[axum::debug_handler]
pub async fn upload_csv(
    State(state): State<AppState>,
    Extension(AdminIdentity(admin)): Extension<AdminIdentity>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse> {
    let mut multipart = multipart?;
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().trim().to_string();
        let data = field.bytes().await?;
        upload = Some((filename, data));
    }

    let (filename, data) =
        upload.ok_or_else(|| Error::BadRequest("Missing multipart field 'file'".into()))?;
    tracing::info!(filename = %filename, bytes = data.len(), uploaded_by = %admin, "client upload received");

    let outcome = state.import_service.import_batch(&filename, &data).await?;
    Ok((StatusCode::CREATED, Json(ImportResponse::from(outcome))))
}

#[utoipa::path(
    get,
    path = "/imports",
    responses(
        (status = 200, description = "Import batches with live client counts", body = [ImportFileResponse])
    ),
    security(("admin_basic" = []))
)]
#[axum::debug_handler]
pub async fn list_imports(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let items = state.import_service.list_batches().await?;
    let items: Vec<ImportFileResponse> = items.into_iter().map(Into::into).collect();
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/imports/{id}",
    params(("id" = i32, Path, description = "Import batch ID")),
    responses(
        (status = 200, description = "Import batch with its clients", body = ImportDetailResponse),
        (status = 404, description = "Import not found")
    ),
    security(("admin_basic" = []))
)]
#[axum::debug_handler]
pub async fn get_import(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<impl IntoResponse> {
    let (summary, clients) = state.import_service.get_batch(id).await?;
    Ok(Json(ImportDetailResponse {
        id: summary.id,
        filename: summary.filename,
        import_date: summary.import_date,
        client_count: summary.client_count,
        clients: clients.into_iter().map(ClientResponse::from).collect(),
    }))
}

#[utoipa::path(
    delete,
    path = "/imports/{id}",
    params(("id" = i32, Path, description = "Import batch ID")),
    responses(
        (status = 200, description = "Import and its clients deleted", body = MessageResponse),
        (status = 404, description = "Import not found")
    ),
    security(("admin_basic" = []))
)]
#[axum::debug_handler]
pub async fn delete_import(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<impl IntoResponse> {
    if !state.import_service.delete_batch(id).await? {
        return Err(Error::NotFound(format!("Import {} not found", id)));
    }
    Ok(Json(MessageResponse::new("Import deleted.")))
}

#[utoipa::path(
    post,
    path = "/total-clients",
    request_body = Vec<i32>,
    responses(
        (status = 200, description = "Client count across the selected imports", body = TotalClientsResponse)
    ),
    security(("admin_basic" = []))
)]
#[axum::debug_handler]
pub async fn total_clients(
    State(state): State<AppState>,
    ApiJson(import_ids): ApiJson<Vec<i32>>,
) -> Result<impl IntoResponse> {
    let total_clients = state.zone_service.total_clients(&import_ids).await?;
    Ok(Json(TotalClientsResponse { total_clients }))
}

#[utoipa::path(
    post,
    path = "/clients-coordinates",
    request_body = Vec<i32>,
    responses(
        (status = 200, description = "Client positions across the selected imports", body = ClientCoordinatesResponse)
    ),
    security(("admin_basic" = []))
)]
#[axum::debug_handler]
pub async fn clients_coordinates(
    State(state): State<AppState>,
    ApiJson(import_ids): ApiJson<Vec<i32>>,
) -> Result<impl IntoResponse> {
    let clients = state.zone_service.clients(&import_ids).await?;
    tracing::info!(imports = ?import_ids, clients = clients.len(), "client coordinates loaded");
    let coordinates: Vec<ClientCoordinate> = clients.into_iter().map(Into::into).collect();
    Ok(Json(ClientCoordinatesResponse { coordinates }))
}
