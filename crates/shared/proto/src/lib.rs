//! gRPC protocol buffer definitions.
//!
//! This crate contains the generated gRPC definitions for the user
//! service: create, list, lookup by id or credentials, partial update
//! and delete.

/// User service definitions.
pub mod user {
    tonic::include_proto!("user");
}

// Re-export commonly used items
pub use user::user_service_server::{UserService, UserServiceServer};
