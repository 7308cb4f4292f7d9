use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use gateway::config::GatewaySettings;

/// Upstream stand-in that reports what it received, with a teapot status
/// so relaying can be told apart from the gateway's own answers.
async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> (StatusCode, Json<Value>) {
    let user = headers.get(common::USER_ID_HEADER).and_then(|v| v.to_str().ok()).map(str::to_string);
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    (
        StatusCode::IM_A_TEAPOT,
        Json(json!({"method": method.as_str(), "uri": uri.to_string(), "user": user, "body": body})),
    )
}

async fn start_upstream() -> anyhow::Result<String> {
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let app = Router::new().fallback(echo);
        if let Err(e) = axum::serve(listener, app).await { eprintln!("upstream error: {}", e); }
    });
    Ok(format!("http://{}", addr))
}

async fn gateway_for(url: &str) -> anyhow::Result<Router> {
    gateway::build_app(&GatewaySettings::for_server(url))
}

async fn call(app: &Router, method: Method, uri: &str, user: Option<&str>, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(id) = user {
        req = req.header(common::USER_ID_HEADER, id);
    }
    let req = match body {
        Some(b) => req.header("content-type", "application/json").body(Body::from(b.to_string()))?,
        None => req.body(Body::empty())?,
    };
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    Ok((status, value))
}

#[tokio::test]
async fn health_and_metrics_are_local() -> anyhow::Result<()> {
    let app = gateway_for("http://127.0.0.1:9").await?;
    let (status, body) = call(&app, Method::GET, "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let resp = app.clone().oneshot(Request::get("/metrics").body(Body::empty())?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn valid_user_is_relayed_verbatim() -> anyhow::Result<()> {
    let app = gateway_for(&start_upstream().await?).await?;
    let payload = json!({"name": "Ann", "email": "ann@example.com"});
    let (status, body) = call(&app, Method::POST, "/users", None, Some(payload.clone())).await?;
    assert_eq!(status, StatusCode::IM_A_TEAPOT);
    assert_eq!(body["method"], "POST");
    assert_eq!(body["uri"], "/users");
    assert_eq!(body["body"], payload);
    Ok(())
}

#[tokio::test]
async fn invalid_shapes_never_reach_the_server() -> anyhow::Result<()> {
    let app = gateway_for(&start_upstream().await?).await?;

    let (status, body) = call(&app, Method::POST, "/users", None, Some(json!({"name": "Ann", "email": "not-an-email"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let (status, _) = call(&app, Method::POST, "/items", Some("1"), Some(json!({"name": "Drill", "description": "x"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, Method::GET, "/items", None, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");

    let (status, _) = call(&app, Method::GET, "/items/1", Some("abc"), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::GET, "/items/search", None, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::POST, "/items/1/comment", Some("1"), Some(json!({"text": "  "}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::POST, "/requests", Some("1"), Some(json!({}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn booking_checks_and_state_normalisation() -> anyhow::Result<()> {
    let app = gateway_for(&start_upstream().await?).await?;
    let now = Utc::now().naive_utc();
    let fmt = |t: chrono::NaiveDateTime| t.format("%Y-%m-%dT%H:%M:%S").to_string();

    let past = json!({"itemId": 1, "start": fmt(now - Duration::days(1)), "end": fmt(now + Duration::days(1))});
    let (status, _) = call(&app, Method::POST, "/bookings", Some("2"), Some(past)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let ok = json!({"itemId": 1, "start": fmt(now + Duration::days(1)), "end": fmt(now + Duration::days(2))});
    let (status, body) = call(&app, Method::POST, "/bookings", Some("2"), Some(ok)).await?;
    assert_eq!(status, StatusCode::IM_A_TEAPOT);
    assert_eq!(body["user"], "2");

    let (status, body) = call(&app, Method::GET, "/bookings?state=waiting&from=0&size=5", Some("2"), None).await?;
    assert_eq!(status, StatusCode::IM_A_TEAPOT);
    assert_eq!(body["uri"], "/bookings?state=WAITING&from=0&size=5");

    let (_, body) = call(&app, Method::GET, "/bookings/owner", Some("2"), None).await?;
    assert_eq!(body["uri"], "/bookings/owner?state=ALL");

    // 客户端未给分页参数时不替它补默认窗口
    let (_, body) = call(&app, Method::GET, "/bookings?state=past", Some("2"), None).await?;
    assert_eq!(body["uri"], "/bookings?state=PAST");

    let (status, body) = call(&app, Method::GET, "/bookings?state=later", Some("2"), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unknown state: later");

    let (status, _) = call(&app, Method::GET, "/bookings?size=0", Some("2"), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::PATCH, "/bookings/3?approved=perhaps", Some("2"), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, body) = call(&app, Method::PATCH, "/bookings/3?approved=true", Some("2"), None).await?;
    assert_eq!(body["uri"], "/bookings/3?approved=true");
    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_bad_gateway() -> anyhow::Result<()> {
    // 先占用再释放端口，得到一个无人监听的地址
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let app = gateway_for(&format!("http://{}", addr)).await?;
    let (status, body) = call(&app, Method::GET, "/users", None, None).await?;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Bad Gateway");
    Ok(())
}
