use std::net::SocketAddr;

use migration::MigratorTrait;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use service::Repositories;

struct TestApp {
    base_url: String,
}

/// Spawn the real server over SQLite on an ephemeral port.
async fn start_server() -> anyhow::Result<TestApp> {
    let db = models::db::connect("sqlite::memory:").await?;
    migration::Migrator::up(&db, None).await?;

    let app = server::build_app(&Repositories::seaorm(db));
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = server::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

#[tokio::test]
async fn e2e_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(format!("{}/health", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_users_items_and_requests_on_sqlite() -> anyhow::Result<()> {
    let app = start_server().await?;
    let client = reqwest::Client::new();

    let owner: Value = client
        .post(format!("{}/users", app.base_url))
        .json(&json!({"name": "owner", "email": "owner@example.com"}))
        .send().await?
        .json().await?;
    let owner_id = owner["id"].as_i64().unwrap_or_default();

    let dup = client
        .post(format!("{}/users", app.base_url))
        .json(&json!({"name": "copy", "email": "owner@example.com"}))
        .send().await?;
    assert_eq!(dup.status(), HttpStatusCode::CONFLICT);

    let req: Value = client
        .post(format!("{}/requests", app.base_url))
        .header(common::USER_ID_HEADER, owner_id)
        .json(&json!({"description": "looking for a ladder"}))
        .send().await?
        .json().await?;

    let res = client
        .post(format!("{}/items", app.base_url))
        .header(common::USER_ID_HEADER, owner_id)
        .json(&json!({"name": "Ladder", "description": "3 m aluminium", "available": true, "requestId": req["id"]}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let found: Value = client
        .get(format!("{}/items/search", app.base_url))
        .query(&[("text", "ALUMIN")])
        .send().await?
        .json().await?;
    assert_eq!(found[0]["name"], "Ladder");

    let detail: Value = client
        .get(format!("{}/requests/{}", app.base_url, req["id"]))
        .send().await?
        .json().await?;
    assert_eq!(detail["items"][0]["name"], "Ladder");

    // 删除用户后，其物品与请求级联删除
    let res = client.delete(format!("{}/users/{}", app.base_url, owner_id)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let res = client.get(format!("{}/requests/{}", app.base_url, req["id"])).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}
