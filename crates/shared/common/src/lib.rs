//! Common utilities shared across the user service crates.
//!
//! This crate provides:
//! - The error envelope with HTTP and gRPC mappings
//! - Configuration structures
//! - The process shutdown signal

pub mod config;
pub mod error;
pub mod shutdown;

pub use config::*;
pub use error::{parse_user_id, AppError, EMPTY_USER_ID, AppResult, ErrorBody, ErrorKind, ErrorResponse};
pub use shutdown::shutdown_signal;
