use std::net::SocketAddr;

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use service::Repositories;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Host/port from the `[server]` section.
fn bind_addr(cfg: &configs::ServerConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server bind address: {e}")))
}

/// Router over the given repositories, with the default CORS policy.
pub fn build_app(repos: &Repositories) -> Router {
    routes::build_router(ServerState::new(repos), build_cors())
}

/// Serve `app` on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Public entry: load config, migrate the database and serve the API.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_default();

    let cfg = configs::AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    // 连接数据库并执行迁移
    let db = models::db::connect_and_migrate(&cfg.database).await?;
    let app = build_app(&Repositories::seaorm(db));

    let addr = bind_addr(&cfg.server)?;
    info!(%addr, "starting shareit server");
    let listener = TcpListener::bind(addr).await?;
    serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_from_config() {
        let cfg = configs::ServerConfig { host: "127.0.0.1".into(), port: 9090, worker_threads: None };
        assert_eq!(bind_addr(&cfg).unwrap().port(), 9090);
        let bad = configs::ServerConfig { host: "not a host".into(), ..cfg };
        assert!(matches!(bind_addr(&bad), Err(StartupError::InvalidConfig(_))));
    }
}
