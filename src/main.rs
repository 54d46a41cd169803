use std::sync::Arc;

use arithmetic_mcp::{build_app, config::Config, domain::tools::default_registry, logging, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = Config::from_env()?;
    let registry = Arc::new(default_registry()?);
    let bind_socket = config.bind_socket()?;

    info!(tools = registry.len(), "tool registry built");

    let state = AppState::new(&config, registry);
    let app = build_app(state.clone());
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        heartbeat_secs = config.heartbeat_interval.as_secs(),
        error_codes = ?config.error_codes,
        "server starting"
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal(state: AppState) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received, closing sse sessions");
    state.begin_shutdown();
}
