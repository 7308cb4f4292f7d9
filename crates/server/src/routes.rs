pub mod bookings;
pub mod items;
pub mod requests;
pub mod users;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;
use crate::state::ServerState;

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: controllers, OpenAPI docs, CORS and tracing.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let users = Router::new()
        .route("/users", post(users::create).get(users::list))
        .route("/users/:id", get(users::get).patch(users::update).delete(users::delete));

    // 静态路径 /items/search 优先于 /items/:id 匹配
    let items = Router::new()
        .route("/items", post(items::create).get(items::list_own))
        .route("/items/search", get(items::search))
        .route("/items/:id", get(items::get).patch(items::update))
        .route("/items/:id/comment", post(items::comment));

    let bookings = Router::new()
        .route("/bookings", post(bookings::create).get(bookings::list_for_booker))
        .route("/bookings/owner", get(bookings::list_for_owner))
        .route("/bookings/:id", get(bookings::get).patch(bookings::decide));

    let requests = Router::new()
        .route("/requests", post(requests::create).get(requests::list_own))
        .route("/requests/all", get(requests::list_others))
        .route("/requests/:id", get(requests::get));

    let api = Router::new()
        .route("/health", get(health))
        .merge(users)
        .merge(items)
        .merge(bookings)
        .merge(requests)
        .with_state(state);

    api.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                // 请求到达时打点
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
