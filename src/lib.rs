use std::{future::Future, sync::Arc, time::Duration};

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::sync::watch;

pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod logging;
pub mod mcp;
pub mod session;

use config::{Config, ErrorCodeMode};
use domain::registry::ToolRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ToolRegistry>,
    pub public_url: Option<Arc<str>>,
    pub fallback_origin: Arc<str>,
    pub heartbeat_interval: Duration,
    pub tool_timeout: Duration,
    pub error_codes: ErrorCodeMode,
    shutdown: Arc<watch::Sender<bool>>,
}

impl AppState {
    pub fn new(config: &Config, registry: Arc<ToolRegistry>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            registry,
            public_url: config.public_url.as_deref().map(Arc::<str>::from),
            fallback_origin: Arc::<str>::from(config.fallback_origin()),
            heartbeat_interval: config.heartbeat_interval,
            tool_timeout: config.tool_timeout,
            error_codes: config.error_codes,
            shutdown: Arc::new(shutdown),
        }
    }

    /// Ends every open session stream so graceful shutdown is not held up by
    /// long-lived `/sse` responses.
    pub fn begin_shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Resolves once [`AppState::begin_shutdown`] has been called.
    pub fn shutdown_requested(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut receiver = self.shutdown.subscribe();
        async move {
            let _ = receiver.wait_for(|stopping| *stopping).await;
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/sse", get(http::handlers::sse_endpoint))
        .route(
            "/messages",
            post(http::handlers::messages_endpoint).fallback(http::handlers::method_not_allowed),
        )
        .fallback(http::handlers::not_found)
        .layer(middleware::from_fn(http::cors::cors_middleware))
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
