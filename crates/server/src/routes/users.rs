use axum::extract::{Path, State};
use axum::Json;

use service::dto::{UserDto, UserInputDto};

use crate::errors::JsonApiError;
use crate::extract::JsonBody;
use crate::state::ServerState;

#[utoipa::path(
    post, path = "/users", tag = "users",
    request_body = crate::openapi::UserInputDoc,
    responses(
        (status = 200, description = "Created user", body = crate::openapi::UserDoc),
        (status = 400, description = "Invalid name or email", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Email already in use", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(State(state): State<ServerState>, JsonBody(input): JsonBody<UserInputDto>) -> Result<Json<UserDto>, JsonApiError> {
    Ok(Json(state.services.users.create_user(input).await?))
}

#[utoipa::path(
    patch, path = "/users/{id}", tag = "users",
    params(("id" = i64, Path, description = "User id")),
    request_body = crate::openapi::UserInputDoc,
    responses(
        (status = 200, description = "Updated user", body = crate::openapi::UserDoc),
        (status = 404, description = "No such user", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Email already in use", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    JsonBody(input): JsonBody<UserInputDto>,
) -> Result<Json<UserDto>, JsonApiError> {
    Ok(Json(state.services.users.update_user(id, input).await?))
}

#[utoipa::path(
    get, path = "/users/{id}", tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = crate::openapi::UserDoc),
        (status = 404, description = "No such user", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i64>) -> Result<Json<UserDto>, JsonApiError> {
    Ok(Json(state.services.users.get_user(id).await?))
}

#[utoipa::path(
    get, path = "/users", tag = "users",
    responses((status = 200, description = "All users by id", body = [crate::openapi::UserDoc]))
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<UserDto>>, JsonApiError> {
    Ok(Json(state.services.users.list_users().await?))
}

#[utoipa::path(
    delete, path = "/users/{id}", tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "No such user", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> Result<(), JsonApiError> {
    state.services.users.delete_user(id).await?;
    Ok(())
}
