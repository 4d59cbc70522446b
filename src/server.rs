//! HTTP application assembly: auth routes, webhook receiver, CORS and fallbacks.

use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::{ErrorBody, IdentityProvider, SessionAuthConfig, SuccessResponse, auth_routes};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CORS_ORIGINS: &str = "https://spacewalk.my.id,https://www.spacewalk.my.id";

#[derive(Debug, thiserror::Error)]
pub enum ServerConfigError {
    #[error("PORT: {0}")]
    InvalidPort(String),
    #[error("CORS origin list is empty")]
    NoOrigins,
    #[error("wildcard CORS origin cannot be combined with credentialed requests")]
    WildcardOrigin,
    #[error("invalid CORS origin {0:?}")]
    InvalidOrigin(String),
}

/// Listener and CORS settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    cors_origins: Vec<HeaderValue>,
}

impl ServerConfig {
    /// # Errors
    ///
    /// Rejects `*`, empty lists and origins that are not `scheme://host[:port]`.
    pub fn new<'a>(
        port: u16,
        origins: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, ServerConfigError> {
        let cors_origins = origins
            .into_iter()
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(parse_origin)
            .collect::<Result<Vec<_>, _>>()?;

        if cors_origins.is_empty() {
            return Err(ServerConfigError::NoOrigins);
        }

        Ok(Self { port, cors_origins })
    }

    /// Create config from environment variables.
    ///
    /// - `PORT`: listening port (default `3000`)
    /// - `CORS_ORIGINS`: comma-separated allowed origins
    ///   (default `https://spacewalk.my.id,https://www.spacewalk.my.id`)
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::new`]; also rejects a non-numeric `PORT`.
    pub fn from_env() -> Result<Self, ServerConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ServerConfigError> {
        let port = match lookup("PORT") {
            Some(p) => p
                .parse()
                .map_err(|e| ServerConfigError::InvalidPort(format!("{p:?}: {e}")))?,
            None => DEFAULT_PORT,
        };
        let origins = lookup("CORS_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.into());
        Self::new(port, origins.split(','))
    }

    #[must_use]
    pub fn cors_origins(&self) -> &[HeaderValue] {
        &self.cors_origins
    }

    fn cors_layer(&self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(self.cors_origins.clone()))
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .expose_headers([header::SET_COOKIE])
    }
}

fn parse_origin(origin: &str) -> Result<HeaderValue, ServerConfigError> {
    if origin.contains('*') {
        return Err(ServerConfigError::WildcardOrigin);
    }
    let url = url::Url::parse(origin)
        .map_err(|_| ServerConfigError::InvalidOrigin(origin.to_owned()))?;
    let serialized = url.origin().ascii_serialization();
    if !url.origin().is_tuple() || serialized != origin.trim_end_matches('/') {
        return Err(ServerConfigError::InvalidOrigin(origin.to_owned()));
    }
    HeaderValue::from_str(&serialized)
        .map_err(|_| ServerConfigError::InvalidOrigin(origin.to_owned()))
}

// ── Webhooks ───────────────────────────────────────────────────────

/// One inbound webhook call, passed through without interpretation.
#[derive(Debug, Clone)]
pub struct WebhookDelivery {
    /// Last path segment, e.g. `tako` for `/webhook/tako`.
    pub name: String,
    pub method: Method,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Receiver for inbound webhooks. The payload schema belongs to the sender.
pub trait WebhookSink: Send + Sync + 'static {
    fn deliver(
        &self,
        delivery: WebhookDelivery,
    ) -> impl Future<Output = Result<(), Box<dyn std::error::Error + Send + Sync>>> + Send;
}

/// Sink that only records deliveries in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl WebhookSink for LogSink {
    async fn deliver(
        &self,
        delivery: WebhookDelivery,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(
            webhook = %delivery.name,
            method = %delivery.method,
            content_type = delivery.content_type.as_deref().unwrap_or("-"),
            bytes = delivery.body.len(),
            "Webhook received"
        );
        Ok(())
    }
}

async fn webhook<W: WebhookSink>(
    State(sink): State<Arc<W>>,
    Path(name): Path<String>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let delivery = WebhookDelivery {
        name,
        method,
        content_type,
        body,
    };
    let name = delivery.name.clone();

    match sink.deliver(delivery).await {
        Ok(()) => Json(SuccessResponse::ok()).into_response(),
        Err(e) => {
            tracing::error!(webhook = %name, error = %e, "Webhook delivery failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("WEBHOOK_FAILED", "Webhook could not be processed.")),
            )
                .into_response()
        }
    }
}

// ── Application ────────────────────────────────────────────────────

/// Build the full application router.
pub fn build_app<P, W>(auth: SessionAuthConfig<P>, sink: W, server: &ServerConfig) -> Router
where
    P: IdentityProvider,
    W: WebhookSink,
{
    let webhooks = Router::new()
        .route("/webhook/{name}", any(webhook::<W>))
        .with_state(Arc::new(sink));

    Router::new()
        .route("/", get(root))
        .merge(auth_routes(auth))
        .merge(webhooks)
        .method_not_allowed_fallback(not_found)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(server.cors_layer())
}

async fn root() -> &'static str {
    "Shh... You weren't supposed to find this."
}

async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new(
            "RESOURCE_NOT_FOUND",
            "The requested endpoint does not exist.",
        )),
    )
}
