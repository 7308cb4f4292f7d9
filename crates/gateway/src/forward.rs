use axum::body::{Body, Bytes};
use axum::http::{header, Method, StatusCode};
use axum::response::Response;
use tracing::{debug, error};

use common::USER_ID_HEADER;

use crate::config::GatewaySettings;
use crate::errors::GatewayError;

/// One call to relay to the server.
#[derive(Debug)]
pub struct Forward<'a> {
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'a str, String)>,
    pub user_id: Option<i64>,
    pub body: Option<Bytes>,
}

impl<'a> Forward<'a> {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), user_id: None, body: None }
    }

    pub fn user(mut self, user_id: Option<i64>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn query(mut self, key: &'a str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    pub fn json(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }
}

/// HTTP client for the internal server.
#[derive(Clone)]
pub struct ServerClient {
    http: reqwest::Client,
    base_url: String,
}

impl ServerClient {
    pub fn new(settings: &GatewaySettings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self { http, base_url: settings.server_url.clone() })
    }

    /// Send the call and hand back the server's status, content type and body as is.
    pub async fn send(&self, call: Forward<'_>) -> Result<Response, GatewayError> {
        let url = format!("{}{}", self.base_url, call.path);
        debug!(method = %call.method, %url, user_id = ?call.user_id, "forwarding");

        let mut req = self.http.request(call.method.clone(), &url);
        if !call.query.is_empty() {
            req = req.query(&call.query);
        }
        if let Some(id) = call.user_id {
            req = req.header(USER_ID_HEADER, id);
        }
        if let Some(body) = call.body {
            req = req.header(header::CONTENT_TYPE, "application/json").body(body);
        }

        let upstream = req.send().await.map_err(|e| {
            error!(method = %call.method, %url, error = %e, "server unreachable");
            GatewayError::Upstream(e.to_string())
        })?;

        let status = upstream.status();
        let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
        let bytes = upstream.bytes().await.map_err(|e| GatewayError::Upstream(e.to_string()))?;
        debug!(method = %call.method, %url, status = status.as_u16(), "relayed");

        let mut resp = Response::new(Body::from(bytes));
        *resp.status_mut() = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        if let Some(ct) = content_type {
            resp.headers_mut().insert(header::CONTENT_TYPE, ct);
        }
        Ok(resp)
    }
}
