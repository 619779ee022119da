//! Combined binary - serves the REST and gRPC adapters from one process
//! over a single shared user service.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use futures::FutureExt;
use tokio::task::JoinError;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rest_api_lib::{routes::create_router, serve_http, state::AppState};
use user_service_lib::{build_user_service, config::UserServiceConfig, serve_grpc};

#[derive(Parser)]
#[command(name = "users-api")]
#[command(about = "User account service with REST and gRPC adapters")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run both adapters; flags override HTTP_* and GRPC_* variables
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        http_port: Option<u16>,
        #[arg(long)]
        grpc_port: Option<u16>,
    },
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            http_port,
            grpc_port,
        } => {
            let mut config = UserServiceConfig::from_env();
            if let Some(host) = host {
                config.http.host = host.clone();
                config.grpc.host = host;
            }
            if let Some(port) = http_port {
                config.http.port = port;
            }
            if let Some(port) = grpc_port {
                config.grpc.port = port;
            }
            serve(config).await?;
        }
        Commands::Migrate { action } => {
            let migrate_action = match action {
                MigrateAction::Up => user_service_lib::MigrateAction::Up,
                MigrateAction::Down => user_service_lib::MigrateAction::Down,
                MigrateAction::Status => user_service_lib::MigrateAction::Status,
                MigrateAction::Fresh => user_service_lib::MigrateAction::Fresh,
            };
            user_service_lib::run_migrations(migrate_action).await?;
        }
    }

    Ok(())
}

async fn serve(config: UserServiceConfig) -> ServerResult {
    let http_addr: SocketAddr = config.http.bind_address().parse()?;
    let grpc_addr: SocketAddr = config.grpc.bind_address().parse()?;

    // One service instance behind both adapters
    let service = build_user_service(&config).await?;
    let app = create_router(AppState::new(service.clone()), &config.cors);

    info!("Starting user service");
    info!("  REST: http://{}", http_addr);
    info!("  gRPC: http://{}", grpc_addr);

    let shutdown = common::shutdown_signal().shared();

    let mut http_handle = tokio::spawn(serve_http(http_addr, app, shutdown.clone()));
    let mut grpc_handle = tokio::spawn(serve_grpc(grpc_addr, service, shutdown));

    // A server that fails outright ends the process; after a signal both drain
    tokio::select! {
        result = &mut http_handle => {
            check_exit("REST server", result)?;
            check_exit("gRPC server", grpc_handle.await)?;
        }
        result = &mut grpc_handle => {
            check_exit("gRPC server", result)?;
            check_exit("REST server", http_handle.await)?;
        }
    }

    info!("Shutdown complete");
    Ok(())
}

type ServerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

fn check_exit(name: &str, result: Result<ServerResult, JoinError>) -> ServerResult {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            error!("{} failed: {}", name, e);
            Err(e)
        }
        Err(e) => {
            error!("{} task panicked: {}", name, e);
            Err(e.into())
        }
    }
}
