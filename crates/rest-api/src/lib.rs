//! REST API Library
//!
//! HTTP adapter over the user domain service. It can be run on its own or
//! next to the gRPC adapter in the combined binary, sharing one service.

pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tracing::info;

use user_service_lib::build_user_service;
use user_service_lib::config::UserServiceConfig;

use crate::routes::create_router;
use crate::state::AppState;

/// Run the REST adapter as a standalone server.
pub async fn run_embedded(host: &str, port: u16) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = UserServiceConfig::from_env();
    let service = build_user_service(&config).await?;

    let app = create_router(AppState::new(service), &config.cors);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    serve_http(addr, app, common::shutdown_signal()).await
}

/// Serve `app` until `shutdown` resolves, letting in-flight requests finish.
pub async fn serve_http<F>(
    addr: SocketAddr,
    app: Router,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("REST server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("REST server stopped");

    Ok(())
}
