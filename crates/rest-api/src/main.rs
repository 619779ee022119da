//! REST API - HTTP adapter for the user service.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use user_service_lib::config::DEFAULT_HTTP_PORT;

#[derive(Parser)]
#[command(name = "rest-api")]
#[command(about = "REST API for user accounts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        #[arg(long, env = "HTTP_HOST", default_value = "0.0.0.0")]
        host: String,
        #[arg(long, env = "HTTP_PORT", default_value_t = DEFAULT_HTTP_PORT)]
        port: u16,
    },
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
        Commands::Serve { host, port } => {
            rest_api_lib::run_embedded(&host, port).await?;
        }
    }

    Ok(())
}
