use axum::extract::{Path, State};
use axum::Json;

use service::dto::{ItemRequestDto, ItemRequestInputDto, ItemRequestWithItemsDto};

use crate::errors::JsonApiError;
use crate::extract::{JsonBody, SharerId};
use crate::state::ServerState;

#[utoipa::path(
    post, path = "/requests", tag = "requests",
    params(("X-Sharer-User-Id" = i64, Header, description = "Requester id")),
    request_body = crate::openapi::ItemRequestInputDoc,
    responses(
        (status = 200, description = "Created request", body = crate::openapi::ItemRequestDoc),
        (status = 404, description = "Requester not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    SharerId(user_id): SharerId,
    JsonBody(input): JsonBody<ItemRequestInputDto>,
) -> Result<Json<ItemRequestDto>, JsonApiError> {
    Ok(Json(state.services.requests.add_request(user_id, input).await?))
}

#[utoipa::path(
    get, path = "/requests", tag = "requests",
    params(("X-Sharer-User-Id" = i64, Header, description = "Requester id")),
    responses((status = 200, description = "Own requests with answering items", body = [crate::openapi::ItemRequestWithItemsDoc]))
)]
pub async fn list_own(
    State(state): State<ServerState>,
    SharerId(user_id): SharerId,
) -> Result<Json<Vec<ItemRequestWithItemsDto>>, JsonApiError> {
    Ok(Json(state.services.requests.list_for_requester(user_id).await?))
}

#[utoipa::path(
    get, path = "/requests/all", tag = "requests",
    params(("X-Sharer-User-Id" = i64, Header, description = "Caller id")),
    responses((status = 200, description = "Requests by other users", body = [crate::openapi::ItemRequestDoc]))
)]
pub async fn list_others(
    State(state): State<ServerState>,
    SharerId(user_id): SharerId,
) -> Result<Json<Vec<ItemRequestDto>>, JsonApiError> {
    Ok(Json(state.services.requests.list_excluding_requester(user_id).await?))
}

#[utoipa::path(
    get, path = "/requests/{id}", tag = "requests",
    params(("id" = i64, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request with answering items", body = crate::openapi::ItemRequestWithItemsDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i64>) -> Result<Json<ItemRequestWithItemsDto>, JsonApiError> {
    Ok(Json(state.services.requests.get(id).await?))
}
