use axum::Router;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::info;

use common::utils::logging::init_logging_json;

use crate::config::GatewaySettings;
use crate::forward::ServerClient;
use crate::routes::{self, GatewayState};

fn init_tracing() { init_logging_json(); }

/// Router forwarding to the server described by `settings`.
pub fn build_app(settings: &GatewaySettings) -> anyhow::Result<Router> {
    let client = ServerClient::new(settings)?;
    Ok(routes::build_router(GatewayState { client }))
}

pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    // Load configuration
    let cfg = configs::AppConfig::load_gateway_or_env()?;
    let settings = GatewaySettings::from_config(&cfg)?;
    info!(bind = %settings.bind, server_url = %settings.server_url, "loaded gateway configuration");

    let app = build_app(&settings)?;
    let listener = TcpListener::bind(settings.bind).await?;
    info!(addr = %listener.local_addr()?, "gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}
