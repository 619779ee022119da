//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the user entity, the create/update DTOs and the credential codec.

pub mod constants;
pub mod error;
pub mod password;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use password::{Argon2Codec, PasswordCodec};
pub use user::{CreateUser, NewUser, UpdateUser, User, UserResponse};
