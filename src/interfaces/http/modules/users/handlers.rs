//! User management handlers
//!
//! Thin wrappers that delegate to `UserDirectoryService` from the
//! application layer.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use super::dto::{CreateUserRequest, UpdateUserRequest, UserDto};
use crate::application::users::UserDirectoryService;
use crate::infrastructure::consent::ConsentHttpClient;
use crate::infrastructure::database::repositories::UserRepository;
use crate::interfaces::http::common::{domain_error_response, ApiResponse};

/// The concrete service type behind the HTTP surface.
pub type SharedUserService = Arc<UserDirectoryService<UserRepository, ConsentHttpClient>>;

/// User handler state — concrete over `UserRepository` and
/// `ConsentHttpClient` for Axum compatibility.
#[derive(Clone)]
pub struct UserHandlerState {
    pub service: SharedUserService,
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users", body = ApiResponse<Vec<UserDto>>)
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, (StatusCode, Json<ApiResponse<Vec<UserDto>>>)> {
    match state.service.list_users().await {
        Ok(users) => {
            let items: Vec<UserDto> = users.into_iter().map(UserDto::from).collect();
            Ok(Json(ApiResponse::success(items)))
        }
        Err(e) => Err(domain_error_response(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = ApiResponse<UserDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_user(
    State(state): State<UserHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserDto>>, (StatusCode, Json<ApiResponse<UserDto>>)> {
    match state.service.get_user(&id).await {
        Ok(Some(user)) => Ok(Json(ApiResponse::success(UserDto::from(user)))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("User '{}' not found", id))),
        )),
        Err(e) => Err(domain_error_response(e)),
    }
}

/// Create a user and register it with the consent manager.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserDto>),
        (status = 400, description = "Validation error or consent URI not configured"),
        (status = 409, description = "Internal ID already exists"),
        (status = 502, description = "Consent manager call failed")
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), (StatusCode, Json<ApiResponse<UserDto>>)> {
    if let Err(errors) = request.validate() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(errors.to_string())),
        ));
    }

    match state.service.create_user(request.into()).await {
        Ok(user) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(UserDto::from(user))),
        )),
        Err(e) => Err(domain_error_response(e)),
    }
}

/// Partial update. Does not cascade to the consent manager.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, (StatusCode, Json<ApiResponse<UserDto>>)> {
    match state.service.update_user(&id, request.into()).await {
        Ok(Some(user)) => Ok(Json(ApiResponse::success(UserDto::from(user)))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("User '{}' not found", id))),
        )),
        Err(e) => Err(domain_error_response(e)),
    }
}

/// Delete a user. The remote consent identifier is not cleaned up.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_user(
    State(state): State<UserHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.service.delete_user(&id).await {
        Ok(()) => Ok(Json(ApiResponse::success(()))),
        Err(e) => Err(domain_error_response(e)),
    }
}
