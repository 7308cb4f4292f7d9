use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use service::dto::{CommentDto, CommentInputDto, ItemDto, ItemInputDto, ItemWithCommentsDto};

use crate::errors::JsonApiError;
use crate::extract::{JsonBody, QueryParams, SharerId};
use crate::state::ServerState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Substring matched against name and description, ignoring case.
    pub text: Option<String>,
}

#[utoipa::path(
    post, path = "/items", tag = "items",
    params(("X-Sharer-User-Id" = i64, Header, description = "Owner id")),
    request_body = crate::openapi::ItemInputDoc,
    responses(
        (status = 200, description = "Created item", body = crate::openapi::ItemDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Owner or request not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    SharerId(owner_id): SharerId,
    JsonBody(input): JsonBody<ItemInputDto>,
) -> Result<Json<ItemDto>, JsonApiError> {
    Ok(Json(state.services.items.add_item(owner_id, input).await?))
}

#[utoipa::path(
    patch, path = "/items/{id}", tag = "items",
    params(
        ("id" = i64, Path, description = "Item id"),
        ("X-Sharer-User-Id" = i64, Header, description = "Owner id")
    ),
    request_body = crate::openapi::ItemInputDoc,
    responses(
        (status = 200, description = "Updated item", body = crate::openapi::ItemDoc),
        (status = 404, description = "Item not found for this owner", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    SharerId(owner_id): SharerId,
    Path(id): Path<i64>,
    JsonBody(patch): JsonBody<ItemInputDto>,
) -> Result<Json<ItemDto>, JsonApiError> {
    Ok(Json(state.services.items.update_item(owner_id, id, patch).await?))
}

#[utoipa::path(
    get, path = "/items/{id}", tag = "items",
    params(("id" = i64, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item with its comments", body = crate::openapi::ItemWithCommentsDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i64>) -> Result<Json<ItemWithCommentsDto>, JsonApiError> {
    Ok(Json(state.services.items.get_item(id).await?))
}

#[utoipa::path(
    get, path = "/items", tag = "items",
    params(("X-Sharer-User-Id" = i64, Header, description = "Owner id")),
    responses((status = 200, description = "Owner's items by id", body = [crate::openapi::ItemDoc]))
)]
pub async fn list_own(State(state): State<ServerState>, SharerId(owner_id): SharerId) -> Result<Json<Vec<ItemDto>>, JsonApiError> {
    Ok(Json(state.services.items.list_for_owner(owner_id).await?))
}

#[utoipa::path(
    get, path = "/items/search", tag = "items",
    params(SearchQuery),
    responses((status = 200, description = "Available items matching the text", body = [crate::openapi::ItemDoc]))
)]
pub async fn search(State(state): State<ServerState>, QueryParams(q): QueryParams<SearchQuery>) -> Result<Json<Vec<ItemDto>>, JsonApiError> {
    let found = state.services.items.search(q.text.as_deref()).await?;
    info!(count = found.len(), "item search");
    Ok(Json(found))
}

#[utoipa::path(
    post, path = "/items/{id}/comment", tag = "items",
    params(
        ("id" = i64, Path, description = "Item id"),
        ("X-Sharer-User-Id" = i64, Header, description = "Author id")
    ),
    request_body = crate::openapi::CommentInputDoc,
    responses(
        (status = 200, description = "Created comment", body = crate::openapi::CommentDoc),
        (status = 400, description = "Author never finished an approved booking", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Item not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn comment(
    State(state): State<ServerState>,
    SharerId(author_id): SharerId,
    Path(id): Path<i64>,
    JsonBody(input): JsonBody<CommentInputDto>,
) -> Result<Json<CommentDto>, JsonApiError> {
    Ok(Json(state.services.items.create_comment(author_id, id, input).await?))
}
