use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use common::pagination::Pagination;
use service::dto::{BookingDto, BookingInputDto};

use crate::errors::JsonApiError;
use crate::extract::{JsonBody, QueryParams, SharerId};
use crate::state::ServerState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// ALL, CURRENT, PAST, FUTURE, WAITING or REJECTED.
    pub state: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

impl ListQuery {
    fn state(&self) -> &str {
        self.state.as_deref().unwrap_or("ALL")
    }

    /// `None` unless the caller sent `from` or `size`.
    fn page(&self) -> Result<Option<Pagination>, JsonApiError> {
        let page = Pagination::requested(self.from, self.size);
        if let Some(p) = &page {
            p.validate().map_err(JsonApiError::bad_request)?;
        }
        Ok(page)
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DecisionQuery {
    /// `true` approves, `false` rejects.
    pub approved: bool,
}

#[utoipa::path(
    post, path = "/bookings", tag = "bookings",
    params(("X-Sharer-User-Id" = i64, Header, description = "Booker id")),
    request_body = crate::openapi::BookingInputDoc,
    responses(
        (status = 200, description = "Booking in WAITING", body = crate::openapi::BookingDoc),
        (status = 400, description = "Item unavailable", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Item or booker not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    SharerId(booker_id): SharerId,
    JsonBody(input): JsonBody<BookingInputDto>,
) -> Result<Json<BookingDto>, JsonApiError> {
    Ok(Json(state.services.bookings.create_booking(booker_id, input).await?))
}

#[utoipa::path(
    patch, path = "/bookings/{id}", tag = "bookings",
    params(
        ("id" = i64, Path, description = "Booking id"),
        ("X-Sharer-User-Id" = i64, Header, description = "Item owner id"),
        DecisionQuery
    ),
    responses(
        (status = 200, description = "Decided booking", body = crate::openapi::BookingDoc),
        (status = 400, description = "Caller is not the item owner", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn decide(
    State(state): State<ServerState>,
    SharerId(user_id): SharerId,
    Path(id): Path<i64>,
    QueryParams(q): QueryParams<DecisionQuery>,
) -> Result<Json<BookingDto>, JsonApiError> {
    Ok(Json(state.services.bookings.update_booking(user_id, id, q.approved).await?))
}

#[utoipa::path(
    get, path = "/bookings/{id}", tag = "bookings",
    params(
        ("id" = i64, Path, description = "Booking id"),
        ("X-Sharer-User-Id" = i64, Header, description = "Booker or item owner id")
    ),
    responses(
        (status = 200, description = "Booking", body = crate::openapi::BookingDoc),
        (status = 400, description = "Caller is neither booker nor owner", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    SharerId(user_id): SharerId,
    Path(id): Path<i64>,
) -> Result<Json<BookingDto>, JsonApiError> {
    Ok(Json(state.services.bookings.get_booking(user_id, id).await?))
}

#[utoipa::path(
    get, path = "/bookings", tag = "bookings",
    params(("X-Sharer-User-Id" = i64, Header, description = "Booker id"), ListQuery),
    responses(
        (status = 200, description = "Caller's bookings, newest start first", body = [crate::openapi::BookingDoc]),
        (status = 400, description = "Unknown state or bad window", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list_for_booker(
    State(state): State<ServerState>,
    SharerId(user_id): SharerId,
    QueryParams(q): QueryParams<ListQuery>,
) -> Result<Json<Vec<BookingDto>>, JsonApiError> {
    let page = q.page()?;
    Ok(Json(state.services.bookings.list_for_booker(user_id, q.state(), page).await?))
}

#[utoipa::path(
    get, path = "/bookings/owner", tag = "bookings",
    params(("X-Sharer-User-Id" = i64, Header, description = "Item owner id"), ListQuery),
    responses(
        (status = 200, description = "Bookings on the caller's items", body = [crate::openapi::BookingDoc]),
        (status = 400, description = "Unknown state or bad window", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Caller owns no items", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list_for_owner(
    State(state): State<ServerState>,
    SharerId(user_id): SharerId,
    QueryParams(q): QueryParams<ListQuery>,
) -> Result<Json<Vec<BookingDto>>, JsonApiError> {
    let page = q.page()?;
    Ok(Json(state.services.bookings.list_for_owner(user_id, q.state(), page).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_defaults() -> Result<(), JsonApiError> {
        let q = ListQuery { state: None, from: None, size: None };
        assert_eq!(q.state(), "ALL");
        assert_eq!(q.page()?, None);
        let q = ListQuery { state: None, from: None, size: Some(3) };
        assert_eq!(q.page()?, Some(Pagination { from: 0, size: 3 }));
        Ok(())
    }

    #[test]
    fn list_query_rejects_bad_window() {
        let q = ListQuery { state: None, from: Some(-1), size: Some(5) };
        assert!(q.page().is_err());
        let q = ListQuery { state: None, from: Some(0), size: Some(0) };
        assert!(q.page().is_err());
    }
}
