//! User service configuration.

use common::{CorsConfig, DatabaseConfig, PasswordHashingConfig, ServerConfig};

/// Default gRPC port
pub const DEFAULT_GRPC_PORT: u16 = 50052;

/// Default REST port
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Process-wide configuration, built once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct UserServiceConfig {
    /// Datastore connection and timeouts
    pub database: DatabaseConfig,
    /// gRPC listener
    pub grpc: ServerConfig,
    /// REST listener
    pub http: ServerConfig,
    /// REST cross-origin policy
    pub cors: CorsConfig,
    /// Password digest work factor
    pub password_hashing: PasswordHashingConfig,
}

impl UserServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            database: DatabaseConfig::from_env(),
            grpc: ServerConfig::from_env("GRPC", DEFAULT_GRPC_PORT),
            http: ServerConfig::from_env("HTTP", DEFAULT_HTTP_PORT),
            cors: CorsConfig::from_env(),
            password_hashing: PasswordHashingConfig::from_env(),
        }
    }
}

impl Default for UserServiceConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            grpc: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: DEFAULT_GRPC_PORT,
            },
            http: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: DEFAULT_HTTP_PORT,
            },
            cors: CorsConfig::default(),
            password_hashing: PasswordHashingConfig::default(),
        }
    }
}
