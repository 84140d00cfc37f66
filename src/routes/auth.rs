use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::auth_dto::{LoginForm, PaginationQuery, RegisterPayload, TokenResponse, UserResponse},
    error::Result,
    utils::extract::{ApiForm, ApiJson, ApiQuery},
    AppState,
};

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid payload or email already registered")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .auth_service
        .register(&payload.email, &payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Bearer token issued", body = TokenResponse),
        (status = 401, description = "Incorrect email or password")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<LoginForm>,
) -> Result<impl IntoResponse> {
    let user = state
        .auth_service
        .authenticate(&form.username, &form.password)
        .await?;
    let session = state.auth_service.issue_session_token(&user)?;
    Ok(Json(TokenResponse {
        access_token: session.access_token,
        token_type: "bearer".to_string(),
        expires_in: session.expires_in,
    }))
}

#[utoipa::path(
    get,
    path = "/admin/users",
    params(
        ("skip" = Option<i64>, Query, description = "Rows to skip"),
        ("limit" = Option<i64>, Query, description = "Maximum rows to return")
    ),
    responses(
        (status = 200, description = "Registered users", body = [UserResponse]),
        (status = 401, description = "Admin credentials required")
    ),
    security(("admin_basic" = []))
)]
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PaginationQuery>,
) -> Result<impl IntoResponse> {
    let users = state
        .auth_service
        .list_users(query.offset(), query.limit())
        .await?;
    let items: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
    Ok(Json(items))
}
