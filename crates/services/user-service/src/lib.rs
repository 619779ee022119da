//! User Service Library
//!
//! The user domain service, its storage port and the gRPC adapter.
//! It can be run as a standalone gRPC service or embedded next to the
//! REST adapter in the combined binary.

pub mod config;
pub mod grpc;
pub mod infra;
pub mod repository;
pub mod service;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tonic::transport::Server;
use tracing::info;

use common::AppError;
use domain::Argon2Codec;

use crate::config::UserServiceConfig;
use crate::grpc::UserGrpcService;
use crate::infra::Database;
use crate::repository::UserStore;
use crate::service::{UserManager, UserService};

/// Connect storage and build the domain service shared by every adapter.
pub async fn build_user_service(
    config: &UserServiceConfig,
) -> Result<Arc<dyn UserService>, Box<dyn std::error::Error + Send + Sync>> {
    let db = Database::connect(&config.database).await?;
    let user_repo = Arc::new(UserStore::new(
        db.get_connection(),
        config.database.query_timeout(),
    ));

    let hashing = &config.password_hashing;
    let codec = Argon2Codec::new(hashing.memory_kib, hashing.iterations, hashing.parallelism)
        .map_err(AppError::from)?;

    Ok(Arc::new(UserManager::new(user_repo, Arc::new(codec))))
}

/// Run the user service as a standalone gRPC server.
pub async fn run_embedded(host: &str, port: u16) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = UserServiceConfig::from_env();
    let service = build_user_service(&config).await?;
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    serve_grpc(addr, service, common::shutdown_signal()).await
}

/// Serve the gRPC adapter until `shutdown` resolves.
pub async fn serve_grpc<F>(
    addr: SocketAddr,
    service: Arc<dyn UserService>,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send,
{
    let grpc_service = UserGrpcService::new(service);

    info!("gRPC server listening on {}", addr);
    Server::builder()
        .add_service(proto::UserServiceServer::new(grpc_service))
        .serve_with_shutdown(addr, shutdown)
        .await?;
    info!("gRPC server stopped");

    Ok(())
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = UserServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                info!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}
