use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method},
    middleware,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use common::{parse_user_id, types::Health, USER_ID_HEADER};

use crate::errors::GatewayError;
use crate::forward::{Forward, ServerClient};
use crate::observability;
use crate::validation::{self as check, BookingBody, CommentBody, ItemBody, RequestBody, UserBody};

#[derive(Clone)]
pub struct GatewayState {
    pub client: ServerClient,
}

type Params = Query<HashMap<String, String>>;
type Relay = Result<Response, GatewayError>;

fn user_id(headers: &HeaderMap) -> Result<i64, GatewayError> {
    let raw = headers.get(USER_ID_HEADER).and_then(|v| v.to_str().ok());
    Ok(parse_user_id(raw)?)
}

/// The header is forwarded when present but not demanded.
fn optional_user_id(headers: &HeaderMap) -> Result<Option<i64>, GatewayError> {
    if headers.contains_key(USER_ID_HEADER) {
        user_id(headers).map(Some)
    } else {
        Ok(None)
    }
}

fn int_param(params: &HashMap<String, String>, key: &str) -> Result<Option<i64>, GatewayError> {
    params
        .get(key)
        .map(|v| v.trim().parse::<i64>().map_err(|_| GatewayError::validation(format!("{key} must be an integer, got {v}"))))
        .transpose()
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (axum::http::StatusCode, String) {
    observability::encode_metrics()
}

// ---- users ----

async fn create_user(State(s): State<GatewayState>, body: Bytes) -> Relay {
    check::new_user(&check::parse_json::<UserBody>(&body)?)?;
    s.client.send(Forward::new(Method::POST, "/users").json(body)).await
}

async fn update_user(State(s): State<GatewayState>, Path(id): Path<i64>, body: Bytes) -> Relay {
    check::user_patch(&check::parse_json::<UserBody>(&body)?)?;
    s.client.send(Forward::new(Method::PATCH, format!("/users/{id}")).json(body)).await
}

async fn get_user(State(s): State<GatewayState>, Path(id): Path<i64>) -> Relay {
    s.client.send(Forward::new(Method::GET, format!("/users/{id}"))).await
}

async fn list_users(State(s): State<GatewayState>) -> Relay {
    s.client.send(Forward::new(Method::GET, "/users")).await
}

async fn delete_user(State(s): State<GatewayState>, Path(id): Path<i64>) -> Relay {
    s.client.send(Forward::new(Method::DELETE, format!("/users/{id}"))).await
}

// ---- items ----

async fn create_item(State(s): State<GatewayState>, headers: HeaderMap, body: Bytes) -> Relay {
    let owner = user_id(&headers)?;
    check::new_item(&check::parse_json::<ItemBody>(&body)?)?;
    s.client.send(Forward::new(Method::POST, "/items").user(Some(owner)).json(body)).await
}

async fn update_item(State(s): State<GatewayState>, headers: HeaderMap, Path(id): Path<i64>, body: Bytes) -> Relay {
    let owner = user_id(&headers)?;
    check::parse_json::<ItemBody>(&body)?;
    s.client.send(Forward::new(Method::PATCH, format!("/items/{id}")).user(Some(owner)).json(body)).await
}

async fn get_item(State(s): State<GatewayState>, headers: HeaderMap, Path(id): Path<i64>) -> Relay {
    let caller = user_id(&headers)?;
    s.client.send(Forward::new(Method::GET, format!("/items/{id}")).user(Some(caller))).await
}

async fn list_items(State(s): State<GatewayState>, headers: HeaderMap) -> Relay {
    let owner = user_id(&headers)?;
    s.client.send(Forward::new(Method::GET, "/items").user(Some(owner))).await
}

async fn search_items(State(s): State<GatewayState>, headers: HeaderMap, Query(params): Params) -> Relay {
    let text = params.get("text").ok_or_else(|| GatewayError::validation("text is required"))?;
    let call = Forward::new(Method::GET, "/items/search").query("text", text).user(optional_user_id(&headers)?);
    s.client.send(call).await
}

async fn create_comment(State(s): State<GatewayState>, headers: HeaderMap, Path(id): Path<i64>, body: Bytes) -> Relay {
    let author = user_id(&headers)?;
    check::new_comment(&check::parse_json::<CommentBody>(&body)?)?;
    s.client.send(Forward::new(Method::POST, format!("/items/{id}/comment")).user(Some(author)).json(body)).await
}

// ---- bookings ----

async fn create_booking(State(s): State<GatewayState>, headers: HeaderMap, body: Bytes) -> Relay {
    let booker = user_id(&headers)?;
    check::new_booking(&check::parse_json::<BookingBody>(&body)?, Utc::now().naive_utc())?;
    s.client.send(Forward::new(Method::POST, "/bookings").user(Some(booker)).json(body)).await
}

async fn decide_booking(State(s): State<GatewayState>, headers: HeaderMap, Path(id): Path<i64>, Query(params): Params) -> Relay {
    let owner = user_id(&headers)?;
    let approved = check::approved(params.get("approved").map(String::as_str))?;
    let call = Forward::new(Method::PATCH, format!("/bookings/{id}")).user(Some(owner)).query("approved", approved);
    s.client.send(call).await
}

async fn get_booking(State(s): State<GatewayState>, headers: HeaderMap, Path(id): Path<i64>) -> Relay {
    let caller = user_id(&headers)?;
    s.client.send(Forward::new(Method::GET, format!("/bookings/{id}")).user(Some(caller))).await
}

async fn list_bookings(State(s): State<GatewayState>, headers: HeaderMap, Query(params): Params) -> Relay {
    let booker = user_id(&headers)?;
    let state = check::booking_state(params.get("state").map(String::as_str))?;
    let mut call = Forward::new(Method::GET, "/bookings").user(Some(booker)).query("state", state);
    if let Some(page) = check::page(int_param(&params, "from")?, int_param(&params, "size")?)? {
        call = call.query("from", page.from).query("size", page.size);
    }
    s.client.send(call).await
}

async fn list_owner_bookings(State(s): State<GatewayState>, headers: HeaderMap, Query(params): Params) -> Relay {
    let owner = user_id(&headers)?;
    let state = check::booking_state(params.get("state").map(String::as_str))?;
    let mut call = Forward::new(Method::GET, "/bookings/owner").user(Some(owner)).query("state", state);
    // 分页参数可选，出现时同样校验
    if let Some(page) = check::page(int_param(&params, "from")?, int_param(&params, "size")?)? {
        call = call.query("from", page.from).query("size", page.size);
    }
    s.client.send(call).await
}

// ---- requests ----

async fn create_request(State(s): State<GatewayState>, headers: HeaderMap, body: Bytes) -> Relay {
    let requester = user_id(&headers)?;
    check::new_request(&check::parse_json::<RequestBody>(&body)?)?;
    s.client.send(Forward::new(Method::POST, "/requests").user(Some(requester)).json(body)).await
}

async fn list_own_requests(State(s): State<GatewayState>, headers: HeaderMap) -> Relay {
    let requester = user_id(&headers)?;
    s.client.send(Forward::new(Method::GET, "/requests").user(Some(requester))).await
}

async fn list_other_requests(State(s): State<GatewayState>, headers: HeaderMap) -> Relay {
    let caller = user_id(&headers)?;
    s.client.send(Forward::new(Method::GET, "/requests/all").user(Some(caller))).await
}

async fn get_request(State(s): State<GatewayState>, headers: HeaderMap, Path(id): Path<i64>) -> Relay {
    let call = Forward::new(Method::GET, format!("/requests/{id}")).user(optional_user_id(&headers)?);
    s.client.send(call).await
}

/// Public router: validation handlers, `/health`, `/metrics`, request metrics and tracing.
pub fn build_router(state: GatewayState) -> Router {
    let api = Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/:id", get(get_user).patch(update_user).delete(delete_user))
        .route("/items", post(create_item).get(list_items))
        .route("/items/search", get(search_items))
        .route("/items/:id", get(get_item).patch(update_item))
        .route("/items/:id/comment", post(create_comment))
        .route("/bookings", post(create_booking).get(list_bookings))
        .route("/bookings/owner", get(list_owner_bookings))
        .route("/bookings/:id", get(get_booking).patch(decide_booking))
        .route("/requests", post(create_request).get(list_own_requests))
        .route("/requests/all", get(list_other_requests))
        .route("/requests/:id", get(get_request))
        .with_state(state)
        .layer(middleware::from_fn(observability::track));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(api)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                // 5xx 以 ERROR 记录
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
