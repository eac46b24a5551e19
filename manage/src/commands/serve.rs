//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use bootstrap::{create_app, Application, Profile};
use common::{AppError, AppResult};
use tower_http::trace::TraceLayer;

use crate::cli::args::ServeArgs;
use crate::database::Database;
use crate::routes::{status_routes, StatusState};

/// Build the application for `profile` with the status routes mounted.
pub async fn build(profile: &Profile) -> AppResult<Application> {
    let database = Database::connect(&profile.settings().database.url).await?;
    tracing::debug!(url = %profile.settings().database.url, "Database connected");

    let routes = status_routes(StatusState {
        environment: Arc::from(profile.name()),
        database,
    });

    create_app(profile, routes)
}

/// Execute the serve command
pub async fn execute(args: ServeArgs, app: Application) -> AppResult<()> {
    let environment = app.environment().to_string();
    let router = app.into_router().layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!(environment = %environment, "Server running on http://{}", addr);

    // Peer addresses are needed by the proxy-fix wrapper
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
