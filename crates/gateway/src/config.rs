use std::net::SocketAddr;
use std::time::Duration;

pub use configs::GatewayConfig;

/// Timeouts and bind address derived from the `[gateway]` section.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub bind: SocketAddr,
    pub server_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl GatewaySettings {
    pub fn from_config(cfg: &GatewayConfig) -> anyhow::Result<Self> {
        let bind = format!("{}:{}", cfg.host, cfg.port).parse()?;
        Ok(Self {
            bind,
            server_url: cfg.server_url.clone(),
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            request_timeout: Duration::from_secs(cfg.request_timeout_secs),
        })
    }

    /// Settings pointing at `server_url` with the default timeouts; used by tests.
    pub fn for_server(server_url: impl Into<String>) -> Self {
        let d = GatewayConfig::default();
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], d.port)),
            server_url: server_url.into().trim_end_matches('/').to_string(),
            connect_timeout: Duration::from_secs(d.connect_timeout_secs),
            request_timeout: Duration::from_secs(d.request_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_from_config() {
        let cfg = GatewayConfig {
            host: "0.0.0.0".into(),
            port: 8081,
            server_url: "http://server:9090".into(),
            connect_timeout_secs: 2,
            request_timeout_secs: 7,
        };
        let s = GatewaySettings::from_config(&cfg).unwrap();
        assert_eq!(s.bind.port(), 8081);
        assert_eq!(s.request_timeout, Duration::from_secs(7));
        assert_eq!(s.server_url, "http://server:9090");
    }

    #[test]
    fn for_server_trims_slash() {
        assert_eq!(GatewaySettings::for_server("http://x:1/").server_url, "http://x:1");
    }
}
